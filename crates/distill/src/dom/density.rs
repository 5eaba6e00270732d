// ABOUTME: Density metrics over a node and its descendants: text, link text, commas, stopwords.
// ABOUTME: Pure functions of the current tree snapshot, recomputed by every stage that needs them.

use std::collections::HashSet;

use ego_tree::iter::Edge;
use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::normalized_len;

/// Textual density metrics for a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DensityMetrics {
    /// Characters of whitespace-normalized text.
    pub text_length: usize,
    /// Characters of whitespace-normalized text inside `<a>` descendants.
    pub link_text_length: usize,
    /// Number of outermost `<a>` elements.
    pub link_count: usize,
    pub comma_count: usize,
    /// Stopwords among the tokens of the non-link text.
    pub stopword_count: usize,
    /// Tokens of the non-link text.
    pub word_count: usize,
}

#[derive(Default)]
struct TextAccumulator {
    all: String,
    link: String,
    prose: String,
    link_count: usize,
}

impl TextAccumulator {
    fn visit(&mut self, root: NodeRef<Node>) {
        let mut link_depth = 0usize;
        for edge in root.traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Text(text) => {
                        self.all.push_str(text);
                        if link_depth > 0 {
                            self.link.push_str(text);
                        } else {
                            self.prose.push_str(text);
                        }
                    }
                    Node::Element(el) => {
                        // Adjacent inline elements must not glue their words together.
                        if link_depth == 0 {
                            self.prose.push(' ');
                        }
                        if el.name() == "a" {
                            if link_depth == 0 {
                                self.link_count += 1;
                            }
                            link_depth += 1;
                        }
                    }
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Node::Element(el) = node.value() {
                        if el.name() == "a" {
                            link_depth = link_depth.saturating_sub(1);
                        }
                        if link_depth == 0 {
                            self.prose.push(' ');
                        }
                    }
                }
            }
        }
    }

    fn finish(self, stopwords: &HashSet<String>) -> DensityMetrics {
        let (word_count, stopword_count) = count_stopwords(&self.prose, stopwords);
        DensityMetrics {
            text_length: normalized_len(&self.all),
            link_text_length: normalized_len(&self.link),
            link_count: self.link_count,
            comma_count: self.all.matches(',').count(),
            stopword_count,
            word_count,
        }
    }
}

impl DensityMetrics {
    /// Metrics over `element` and all its descendants.
    pub fn of(element: ElementRef<'_>, stopwords: &HashSet<String>) -> Self {
        let mut acc = TextAccumulator::default();
        acc.visit(*element);
        acc.finish(stopwords)
    }

    /// Metrics over a run of sibling nodes (text and elements) treated as one unit.
    pub fn of_nodes<'a>(
        nodes: impl IntoIterator<Item = NodeRef<'a, Node>>,
        stopwords: &HashSet<String>,
    ) -> Self {
        let mut acc = TextAccumulator::default();
        for node in nodes {
            acc.visit(node);
        }
        acc.finish(stopwords)
    }

    /// Fraction of the text inside links; `0.0` when there is no text.
    pub fn link_density(&self) -> f64 {
        if self.text_length == 0 {
            return 0.0;
        }
        (self.link_text_length as f64 / self.text_length as f64).min(1.0)
    }

    /// Fraction of the non-link words that are stopwords; `0.0` without words.
    pub fn stopword_density(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        self.stopword_count as f64 / self.word_count as f64
    }
}

/// Count `(words, stopwords)` among whitespace-delimited tokens, punctuation trimmed.
pub fn count_stopwords(text: &str, stopwords: &HashSet<String>) -> (usize, usize) {
    let mut words = 0;
    let mut hits = 0;
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() {
            continue;
        }
        words += 1;
        if stopwords.contains(&token.to_lowercase()) {
            hits += 1;
        }
    }
    (words, hits)
}
