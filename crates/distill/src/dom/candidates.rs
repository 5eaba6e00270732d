// ABOUTME: Top-candidate selection and sibling merging over the scored document tree.
// ABOUTME: Produces a TopNode that references the winner and merged siblings in document order.

use ego_tree::NodeId;
use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use super::density::DensityMetrics;
use super::scoring::{get_score, NodeScores};
use super::{
    body_or_root, element_text, has_sentence_end, is_candidate_tag, is_non_top_candidate_tag,
};
use crate::options::{Config, Options};

/// The selected article body: a synthetic container over existing siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct TopNode {
    pub winner: NodeId,
    /// Winner plus merged siblings, in document order.
    pub members: Vec<NodeId>,
    pub score: f64,
    /// True when nothing scored above zero and the body (or root) was used.
    pub fallback: bool,
}

impl TopNode {
    /// Number of merged subtrees, the winner included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member elements, in document order.
    pub fn elements<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        self.members
            .iter()
            .filter_map(|id| doc.tree.get(*id))
            .filter_map(ElementRef::wrap)
            .collect()
    }
}

/// Find the highest scoring element that may act as a container.
///
/// The walk is pre-order from the tree root and ties keep the first
/// element seen, so the choice is deterministic.
pub fn find_top_candidate<'a>(
    doc: &'a Html,
    scores: &NodeScores,
) -> Option<(ElementRef<'a>, f64)> {
    let mut best: Option<(ElementRef<'a>, f64)> = None;
    let mut top_score = 0.0;

    for node in doc.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let Some(&score) = scores.get(&element.id()) else {
            continue;
        };
        if is_non_top_candidate_tag(element.value().name()) {
            continue;
        }
        if score > top_score {
            top_score = score;
            best = Some((element, score));
        }
    }

    best
}

/// Collect the winner and the siblings that belong with it.
///
/// A sibling joins when its cumulative score is a large enough share of the
/// winner's, or when it is a clean text-bearing candidate that reads like a
/// sentence or is long enough on its own.
pub fn merge_siblings(
    winner: ElementRef<'_>,
    top_score: f64,
    scores: &NodeScores,
    config: &Config,
    options: &Options,
) -> Vec<NodeId> {
    let Some(parent) = winner.parent() else {
        return vec![winner.id()];
    };

    let threshold = top_score * options.sibling_score_ratio;
    let mut members = Vec::new();

    for sibling in parent.children().filter_map(ElementRef::wrap) {
        if sibling.id() == winner.id() {
            members.push(sibling.id());
            continue;
        }

        let tag = sibling.value().name();
        if is_non_top_candidate_tag(tag) || config.noise_tags.contains(tag) {
            continue;
        }

        let score = get_score(scores, sibling.id());
        if score > 0.0 && score >= threshold {
            trace!(tag, score, threshold, "merged sibling by score");
            members.push(sibling.id());
            continue;
        }

        if is_candidate_tag(tag) && reads_as_content(sibling, config, options) {
            trace!(tag, "merged text-bearing sibling");
            members.push(sibling.id());
            continue;
        }

        trace!(tag, score, "skipped sibling");
    }

    members
}

fn reads_as_content(sibling: ElementRef<'_>, config: &Config, options: &Options) -> bool {
    let metrics = DensityMetrics::of(sibling, &config.stopwords);
    if metrics.text_length == 0 || metrics.link_density() >= options.sibling_link_density {
        return false;
    }
    metrics.text_length > options.long_paragraph_len || has_sentence_end(&element_text(&sibling))
}

/// Pick the article body: best container plus merged siblings, or the
/// body/root fallback when nothing scored above zero.
pub fn select_top_node(
    scores: &NodeScores,
    doc: &Html,
    config: &Config,
    options: &Options,
) -> TopNode {
    let top = match find_top_candidate(doc, scores) {
        Some((winner, score)) => TopNode {
            winner: winner.id(),
            members: merge_siblings(winner, score, scores, config, options),
            score,
            fallback: false,
        },
        None => {
            let fallback = body_or_root(doc);
            TopNode {
                winner: fallback.id(),
                members: vec![fallback.id()],
                score: 0.0,
                fallback: true,
            }
        }
    };

    debug!(
        score = top.score,
        members = top.members.len(),
        fallback = top.fallback,
        "selected top node"
    );
    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::scoring::score_content;
    use scraper::Selector;

    fn id_of(doc: &Html, css: &str) -> NodeId {
        let sel = Selector::parse(css).unwrap();
        doc.root_element().select(&sel).next().unwrap().id()
    }

    fn select(doc: &Html) -> TopNode {
        let config = Config::default();
        let options = Options::default();
        let scores = score_content(doc, &config, &options);
        select_top_node(&scores, doc, &config, &options)
    }

    #[test]
    fn test_highest_container_wins() {
        let doc = Html::parse_document(
            "<div id=main><p>Sentence one, with a comma.</p><p>Sentence two.</p></div>",
        );
        let top = select(&doc);
        assert_eq!(top.winner, id_of(&doc, "#main"));
        assert!(!top.fallback);
        assert!((top.score - 5.3).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_in_document_order() {
        let mut scores = NodeScores::new();
        let doc = Html::parse_document("<div id=a></div><div id=b></div>");
        scores.insert(id_of(&doc, "#a"), 2.0);
        scores.insert(id_of(&doc, "#b"), 2.0);
        let (winner, _) = find_top_candidate(&doc, &scores).unwrap();
        assert_eq!(winner.id(), id_of(&doc, "#a"));
    }

    #[test]
    fn test_inline_tags_never_win() {
        let mut scores = NodeScores::new();
        let doc = Html::parse_document("<div id=d><span id=s>x</span></div>");
        scores.insert(id_of(&doc, "#s"), 9.0);
        scores.insert(id_of(&doc, "#d"), 1.0);
        let (winner, _) = find_top_candidate(&doc, &scores).unwrap();
        assert_eq!(winner.id(), id_of(&doc, "#d"));
    }

    #[test]
    fn test_fallback_to_body() {
        let doc = Html::parse_document("<p>Hello</p>");
        let top = select(&doc);
        assert!(top.fallback);
        assert_eq!(top.winner, id_of(&doc, "body"));
        assert_eq!(top.members, vec![top.winner]);
    }

    #[test]
    fn test_fallback_to_root_without_body() {
        let doc = Html::parse_fragment("<span>tiny</span>");
        let top = select(&doc);
        assert!(top.fallback);
        assert_eq!(top.winner, doc.root_element().id());
    }

    #[test]
    fn test_siblings_merged_by_score_ratio() {
        let doc = Html::parse_document(
            "<div id=a><p>Sentence one, with a comma, and then some more.</p></div>\
             <div id=b><p>Another, with a comma.</p></div>\
             <div id=c><p>xyz</p></div>",
        );
        let top = select(&doc);
        assert_eq!(top.winner, id_of(&doc, "#a"));
        assert_eq!(top.members, vec![id_of(&doc, "#a"), id_of(&doc, "#b")]);
    }

    #[test]
    fn test_text_sibling_merged_by_sentence_end() {
        let doc = Html::parse_document(
            "<article><div id=w><p>Sentence one, with a comma, and the rest.</p></div>\
             <p id=s>Short one.</p><p id=n>no ending</p>\
             <p id=l><a href=/x>Linked sentence.</a></p></article>",
        );
        let config = Config::default();
        let options = Options::default();
        let scores = score_content(&doc, &config, &options);
        let members = merge_siblings(
            doc.root_element()
                .select(&Selector::parse("#w").unwrap())
                .next()
                .unwrap(),
            100.0,
            &scores,
            &config,
            &options,
        );
        assert_eq!(members, vec![id_of(&doc, "#w"), id_of(&doc, "#s")]);
    }

    #[test]
    fn test_members_stay_in_document_order() {
        let doc = Html::parse_document(
            "<div id=a><p>Lead, with a comma.</p></div>\
             <div id=b><p>Sentence one, with a comma, and another, and the rest of it.</p></div>",
        );
        let top = select(&doc);
        assert_eq!(top.winner, id_of(&doc, "#b"));
        assert_eq!(top.members, vec![id_of(&doc, "#a"), id_of(&doc, "#b")]);
    }
}
