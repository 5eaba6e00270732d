// ABOUTME: Node scoring for content extraction: base scores for text-bearing candidates.
// ABOUTME: Propagates each base score to the nearest ancestors with a decaying weight.

use std::collections::HashMap;

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

use super::density::{count_stopwords, DensityMetrics};
use super::{is_candidate_tag, normalized_len};
use crate::options::{Config, Options};

/// Score storage using NodeId as key
pub type NodeScores = HashMap<NodeId, f64>;

/// Cumulative score of a node; nodes without an entry score zero.
pub fn get_score(scores: &NodeScores, id: NodeId) -> f64 {
    scores.get(&id).copied().unwrap_or(0.0)
}

/// Text a candidate carries itself. Inline formatting counts; link text
/// and the text of nested candidates do not, so no text is scored twice.
pub fn own_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    // Depth inside a link or nested candidate; nothing is kept while positive.
    let mut skipped = 0usize;
    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) if skipped == 0 => out.push_str(text),
                Node::Element(el) if node.id() != element.id() => {
                    if skipped > 0 || el.name() == "a" || is_candidate_tag(el.name()) {
                        skipped += 1;
                    } else {
                        out.push(' ');
                    }
                }
                _ => {}
            },
            Edge::Close(node) if node.id() != element.id() => {
                if node.value().is_element() {
                    if skipped > 0 {
                        skipped -= 1;
                    } else {
                        out.push(' ');
                    }
                }
            }
            Edge::Close(_) => {}
        }
    }
    out
}

/// Base score of a single candidate element.
///
/// Length past the baseline, commas and stopword density of the
/// candidate's own text all count as evidence of prose. Link-heavy
/// candidates keep only the non-link share of their score.
pub fn score_node(element: ElementRef<'_>, config: &Config, options: &Options) -> f64 {
    let own = own_text(element);
    let (words, stopwords) = count_stopwords(&own, &config.stopwords);

    let mut score = 0.0;
    if normalized_len(&own) >= options.baseline_text_len {
        score += options.baseline_bonus;
    }
    score += own.matches(',').count() as f64;
    if words > 0 {
        score += options.stopword_weight * stopwords as f64 / words as f64;
    }

    let density = DensityMetrics::of(element, &config.stopwords).link_density();
    if density > options.high_link_density {
        score *= 1.0 - density;
    }
    score
}

/// Score every candidate in the document and accumulate the results on
/// their element ancestors.
///
/// Scoring only reads the tree. Contributions are summed, so the result
/// does not depend on candidate order.
pub fn score_content(doc: &Html, config: &Config, options: &Options) -> NodeScores {
    let mut scores = NodeScores::new();
    let mut candidates = 0usize;

    for node in doc.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if !is_candidate_tag(element.value().name()) {
            continue;
        }
        candidates += 1;

        let base = score_node(element, config, options);
        let ancestors = element.ancestors().filter_map(ElementRef::wrap);
        for (ancestor, weight) in ancestors.zip(options.decay.iter()) {
            *scores.entry(ancestor.id()).or_insert(0.0) += base * weight;
        }
    }

    debug!(candidates, scored = scores.len(), "scored content");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        doc.root_element().select(&sel).next().unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_node_sums_length_commas_and_stopwords() {
        let doc = Html::parse_fragment("<p>Sentence one, with a comma.</p>");
        let score = score_node(first(&doc, "p"), &Config::default(), &Options::default());
        // baseline 1.0 + one comma + 3.0 * (3 stopwords / 5 words)
        assert!(approx(score, 3.8), "got {}", score);
    }

    #[test]
    fn test_short_candidate_gets_no_baseline() {
        let doc = Html::parse_fragment("<p>Sentence two.</p>");
        let score = score_node(first(&doc, "p"), &Config::default(), &Options::default());
        assert!(approx(score, 1.5), "got {}", score);
    }

    #[test]
    fn test_link_heavy_candidate_is_scaled_down() {
        let doc = Html::parse_fragment(
            r#"<p>a, <a href="/x">a very long anchor text that dominates, really</a></p>"#,
        );
        let p = first(&doc, "p");
        let density = DensityMetrics::of(p, &Config::default().stopwords).link_density();
        assert!(density > 0.5);

        let opts = Options::default();
        let unscaled = Options {
            high_link_density: 1.0,
            ..Options::default()
        };
        let scaled = score_node(p, &Config::default(), &opts);
        let raw = score_node(p, &Config::default(), &unscaled);
        assert!(approx(scaled, raw * (1.0 - density)));
    }

    #[test]
    fn test_nested_candidate_text_is_not_scored_twice() {
        let doc = Html::parse_fragment(
            "<table><tr><td id=outer>Cell note, here<p>Para, with, commas.</p></td>\
             <td id=plain>Cell note, here</td></tr></table>",
        );
        let config = Config::default();
        let options = Options::default();
        let outer = score_node(first(&doc, "#outer"), &config, &options);
        let plain = score_node(first(&doc, "#plain"), &config, &options);
        assert!(approx(outer, plain), "{} != {}", outer, plain);
    }

    #[test]
    fn test_wrapping_cell_propagates_only_paragraph_score() {
        let doc = Html::parse_document(
            "<table><tr><td><p>Sentence one, with a comma.</p></td></tr></table>",
        );
        let scores = score_content(&doc, &Config::default(), &Options::default());
        assert!(approx(get_score(&scores, first(&doc, "td").id()), 3.8));
        assert!(approx(get_score(&scores, first(&doc, "tr").id()), 1.9));
    }

    #[test]
    fn test_own_text_skips_links_and_keeps_formatting() {
        let doc = Html::parse_fragment(
            r#"<p>Read <b>this</b>, then <a href="/x">the, link</a> and go.</p>"#,
        );
        let own = own_text(first(&doc, "p"));
        assert_eq!(crate::dom::normalize_spaces(&own), "Read this , then and go.");
        assert_eq!(own.matches(',').count(), 1);
    }

    #[test]
    fn test_propagation_decays_over_three_ancestors() {
        let doc = Html::parse_document(
            "<div id=a><div id=b><div id=c><p>Sentence one, with a comma.</p></div></div></div>",
        );
        let scores = score_content(&doc, &Config::default(), &Options::default());

        assert!(approx(get_score(&scores, first(&doc, "#c").id()), 3.8));
        assert!(approx(get_score(&scores, first(&doc, "#b").id()), 1.9));
        assert!(approx(get_score(&scores, first(&doc, "#a").id()), 0.95));
        assert!(!scores.contains_key(&first(&doc, "body").id()));
        assert!(!scores.contains_key(&first(&doc, "p").id()));
    }

    #[test]
    fn test_contributions_are_summed() {
        let doc = Html::parse_document(
            "<div><p>Sentence one, with a comma.</p><p>Sentence two.</p></div>",
        );
        let scores = score_content(&doc, &Config::default(), &Options::default());
        assert!(approx(get_score(&scores, first(&doc, "div").id()), 5.3));
        assert!(approx(get_score(&scores, first(&doc, "body").id()), 2.65));
    }

    #[test]
    fn test_zero_contributions_still_create_entries() {
        let doc = Html::parse_document("<section><p>xyz</p></section>");
        let scores = score_content(&doc, &Config::default(), &Options::default());
        let id = first(&doc, "section").id();
        assert!(scores.contains_key(&id));
        assert_eq!(get_score(&scores, id), 0.0);
    }

    #[test]
    fn test_table_cells_are_candidates() {
        let doc = Html::parse_document(
            "<table><tr><td>Row text, with commas, and the words.</td></tr></table>",
        );
        let scores = score_content(&doc, &Config::default(), &Options::default());
        assert!(get_score(&scores, first(&doc, "tr").id()) > 0.0);
    }
}
