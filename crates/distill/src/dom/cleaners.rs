// ABOUTME: Cleaning pipeline that prunes structurally certain noise from the document tree in place.
// ABOUTME: Applies noise-tag, noise-class and block length-floor rules in a fixed order.

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node};
use tracing::debug;

use super::{detach, is_block_tag, is_protected_tag, normalized_len};
use crate::options::{Config, Options};

/// Tags that never contain extractable prose.
pub const NOISE_TAGS: &[&str] = &[
    "script", "noscript", "style", "template", "link", "meta", "figure", "figcaption",
    "picture", "source", "video", "audio", "iframe", "object", "embed", "svg", "canvas",
];

/// Classes marking text hidden from layout (accessibility-only copy and the like).
pub const NOISE_CLASSES: &[&str] = &[
    "screen-reader-text",
    "screen-reader-only",
    "sr-only",
    "visually-hidden",
    "visuallyhidden",
    "hidden-visually",
];

/// The cleaning rules, applied in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanRule {
    NoiseTag,
    NoiseClass,
    LengthFloor,
}

impl CleanRule {
    /// The fixed pipeline order. The length floor must run last: structural
    /// pruning can leave wrappers newly empty.
    pub const ORDER: [CleanRule; 3] = [
        CleanRule::NoiseTag,
        CleanRule::NoiseClass,
        CleanRule::LengthFloor,
    ];

    /// Collect the ids this rule removes from the current tree.
    fn mark(self, doc: &Html, config: &Config, options: &Options) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            CleanRule::NoiseTag => {
                let is_noise = |node: &Node| {
                    node.as_element()
                        .map(|el| config.noise_tags.contains(el.name()))
                        .unwrap_or(false)
                };
                mark_outermost(doc.tree.root(), &mut out, &is_noise);
            }
            CleanRule::NoiseClass => {
                let is_noise = |node: &Node| {
                    node.as_element()
                        .map(|el| {
                            !is_protected_tag(el.name())
                                && el.classes().any(|c| config.noise_classes.contains(c))
                        })
                        .unwrap_or(false)
                };
                mark_outermost(doc.tree.root(), &mut out, &is_noise);
            }
            CleanRule::LengthFloor => {
                scan_floor(doc.tree.root(), options.min_block_text_len, &mut out);
            }
        }
        out
    }
}

/// Removal counts per rule for one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub noise_tags: usize,
    pub noise_classes: usize,
    pub empty_blocks: usize,
}

impl CleanReport {
    /// Total number of subtrees removed.
    pub fn total(&self) -> usize {
        self.noise_tags + self.noise_classes + self.empty_blocks
    }
}

/// Run every cleaning rule over the tree, detaching the nodes they mark.
pub fn clean_document(doc: &mut Html, config: &Config, options: &Options) -> CleanReport {
    let mut report = CleanReport::default();
    for rule in CleanRule::ORDER {
        let removed = apply_rule(doc, rule, config, options);
        match rule {
            CleanRule::NoiseTag => report.noise_tags = removed,
            CleanRule::NoiseClass => report.noise_classes = removed,
            CleanRule::LengthFloor => report.empty_blocks = removed,
        }
    }
    debug!(
        noise_tags = report.noise_tags,
        noise_classes = report.noise_classes,
        empty_blocks = report.empty_blocks,
        "cleaned document"
    );
    report
}

/// Apply a single rule; returns the number of subtrees detached.
pub fn apply_rule(doc: &mut Html, rule: CleanRule, config: &Config, options: &Options) -> usize {
    let ids = rule.mark(doc, config, options);
    for id in &ids {
        detach(doc, *id);
    }
    ids.len()
}

/// Pre-order walk collecting nodes matching `pred`; matched subtrees are not descended.
fn mark_outermost(root: NodeRef<Node>, out: &mut Vec<NodeId>, pred: &dyn Fn(&Node) -> bool) {
    let mut stack: Vec<NodeRef<Node>> = root.children().rev().collect();
    while let Some(node) = stack.pop() {
        if pred(node.value()) {
            out.push(node.id());
        } else {
            stack.extend(node.children().rev());
        }
    }
}

/// Running state of one open element during the floor scan.
#[derive(Default)]
struct FloorFrame {
    text: String,
    /// Non-link text reached without crossing a block boundary.
    own_text: bool,
    /// A surviving block in this subtree carries text of its own.
    anchored: bool,
}

/// Post-order scan marking block elements that are empty, or short wrappers
/// whose text comes only from links or from blocks already judged. Children
/// are decided before their parent so wrappers emptied by earlier removals
/// are caught in the same pass.
///
/// Text inside inline formatting (`<em>`, `<b>`, `<span>`) belongs to the
/// enclosing block; text inside `<a>` does not.
fn scan_floor(root: NodeRef<Node>, min_len: usize, out: &mut Vec<NodeId>) {
    let mut frames: Vec<FloorFrame> = Vec::new();
    let mut link_depth = 0usize;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(t) => {
                    if let Some(frame) = frames.last_mut() {
                        frame.text.push_str(t);
                        if link_depth == 0 && !t.trim().is_empty() {
                            frame.own_text = true;
                        }
                    }
                }
                Node::Element(el) => {
                    if el.name() == "a" {
                        link_depth += 1;
                    }
                    frames.push(FloorFrame::default());
                }
                _ => {}
            },
            Edge::Close(node) => {
                let Some(el) = node.value().as_element() else {
                    continue;
                };
                if el.name() == "a" {
                    link_depth = link_depth.saturating_sub(1);
                }
                let Some(frame) = frames.pop() else {
                    continue;
                };

                let block = is_block_tag(el.name());
                if block && !is_protected_tag(el.name()) {
                    let len = normalized_len(&frame.text);
                    if len == 0 || (len < min_len && !frame.own_text && !frame.anchored) {
                        out.push(node.id());
                        continue;
                    }
                }

                if let Some(parent) = frames.last_mut() {
                    parent.text.push_str(&frame.text);
                    parent.anchored |= frame.anchored || (block && frame.own_text);
                    if !block {
                        parent.own_text |= frame.own_text;
                    }
                }
            }
        }
    }
}
