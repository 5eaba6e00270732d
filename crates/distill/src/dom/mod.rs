// ABOUTME: DOM manipulation and traversal utilities shared by the pipeline stages.
// ABOUTME: Provides tag classification, text helpers and in-place detach on scraper's document tree.

//! DOM utilities for the extraction pipeline.
//!
//! The document tree is `scraper::Html`, an `ego_tree` arena. Nodes are
//! identified by `NodeId`, which stays stable while the tree is read, so
//! per-node values (scores) are kept in side maps keyed by `NodeId` instead
//! of on the nodes themselves.

pub mod candidates;
pub mod cleaners;
pub mod density;
pub mod scoring;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};

/// Block-level tags. Used by the length floor and by paragraph segmentation.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "dialog", "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav",
    "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul",
];

/// Text-bearing tags that receive a base score.
const CANDIDATE_TAGS: &[&str] = &["p", "pre", "td"];

/// Tags that can never be the top node.
const NON_TOP_CANDIDATE_TAGS: &[&str] = &[
    "a", "area", "b", "base", "basefont", "br", "em", "i", "img", "input", "label", "link",
    "meta", "span", "strong", "hr",
];

/// Tags that are never removed by cleaning.
const PROTECTED_TAGS: &[&str] = &["html", "head", "body"];

/// Returns true for block-level tag names.
pub fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// Returns true for paragraph-like, table-cell and preformatted tags.
pub fn is_candidate_tag(name: &str) -> bool {
    CANDIDATE_TAGS.contains(&name)
}

/// Returns true for tags that may not be selected as the top node.
pub fn is_non_top_candidate_tag(name: &str) -> bool {
    NON_TOP_CANDIDATE_TAGS.contains(&name)
}

/// Returns true for the document skeleton tags.
pub fn is_protected_tag(name: &str) -> bool {
    PROTECTED_TAGS.contains(&name)
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of characters in the whitespace-normalized form of `text`.
pub fn normalized_len(text: &str) -> usize {
    normalize_spaces(text).chars().count()
}

/// Text of the element's own text-node children, excluding descendants.
pub fn direct_text(element: &ElementRef) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect()
}

/// Text of the element and all its descendants, as-is.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect()
}

/// Check if text ends with sentence-ending punctuation, ignoring closing quotes.
pub fn has_sentence_end(text: &str) -> bool {
    let trimmed = text
        .trim_end()
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | '”' | '’' | ')'));
    matches!(
        trimmed.chars().last(),
        Some('.' | '!' | '?' | ':' | ';' | '…')
    )
}

/// The `<body>` element, or the root element when the tree has no body.
pub fn body_or_root(doc: &Html) -> ElementRef<'_> {
    doc.root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or_else(|| doc.root_element())
}

/// Detach a node (and its subtree) from the tree. Unknown ids are ignored.
pub fn detach(doc: &mut Html, id: NodeId) {
    if let Some(mut node) = doc.tree.get_mut(id) {
        node.detach();
    }
}

/// Something that can be turned into a document tree for the pipeline.
pub trait IntoDocument {
    fn into_document(self) -> Html;
}

impl IntoDocument for Html {
    fn into_document(self) -> Html {
        self
    }
}

impl IntoDocument for &Html {
    fn into_document(self) -> Html {
        self.clone()
    }
}

impl IntoDocument for &str {
    fn into_document(self) -> Html {
        Html::parse_document(self)
    }
}

impl IntoDocument for String {
    fn into_document(self) -> Html {
        Html::parse_document(&self)
    }
}

impl IntoDocument for &String {
    fn into_document(self) -> Html {
        Html::parse_document(self)
    }
}

/// Escape text for inclusion in serialized markup.
pub(crate) fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize a node: elements as outer HTML, text escaped, everything else dropped.
pub(crate) fn serialize_node(node: NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(_) => {
            if let Some(el) = ElementRef::wrap(node) {
                out.push_str(&el.html());
            }
        }
        _ => {}
    }
}
