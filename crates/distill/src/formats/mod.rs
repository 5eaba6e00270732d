// ABOUTME: Output formatting for the selected article body.
// ABOUTME: Segments the top node into paragraphs, filters remnants, renders text, HTML and Markdown.

//! Output format module.
//!
//! The top node is segmented into paragraphs: a leaf block is one
//! paragraph, otherwise runs of inline content between block children (or
//! `<br>` breaks) are. Short and link-heavy paragraphs are dropped before
//! any rendition is produced, so text, structure and Markdown always agree
//! on which paragraphs survived.

use std::collections::HashSet;

use ego_tree::iter::{Children, Edge};
use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::Serialize;
use tracing::debug;

use crate::dom::candidates::TopNode;
use crate::dom::density::DensityMetrics;
use crate::dom::{is_block_tag, is_protected_tag, normalize_spaces, serialize_node};
use crate::options::{Config, Options};

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Text containers whose contents are never rendered as document text.
const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// One unit of output text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    /// Whitespace-normalized text.
    pub text: String,
    /// Text exactly as it appears in the document.
    #[serde(skip)]
    pub raw: String,
    /// Markup of the paragraph; inline runs are wrapped in `<p>`.
    pub html: String,
    #[serde(skip)]
    pub link_density: f64,
}

impl Paragraph {
    fn from_nodes<'a>(
        nodes: &[NodeRef<'a, Node>],
        html: String,
        stopwords: &HashSet<String>,
    ) -> Self {
        let mut raw = String::new();
        for node in nodes {
            collect_raw_text(*node, &mut raw);
        }
        let metrics = DensityMetrics::of_nodes(nodes.iter().copied(), stopwords);
        Self {
            text: normalize_spaces(&raw),
            raw,
            html,
            link_density: metrics.link_density(),
        }
    }

    /// Number of characters of normalized text.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text of a subtree with `<br>` rendered as a line break.
fn collect_raw_text(node: NodeRef<Node>, out: &mut String) {
    collect_text(node, out, false);
}

/// Text of a subtree; `block_gap` pads block elements with spaces so words
/// in adjacent blocks stay apart.
fn collect_text(root: NodeRef<Node>, out: &mut String, block_gap: bool) {
    // Depth inside a non-text container; nothing is emitted while positive.
    let mut hidden = 0usize;
    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) if hidden == 0 => out.push_str(text),
                Node::Element(el) => {
                    if hidden > 0 || NON_TEXT_TAGS.contains(&el.name()) {
                        hidden += 1;
                    } else if el.name() == "br" {
                        out.push('\n');
                    } else if block_gap && is_block_tag(el.name()) {
                        out.push(' ');
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value() {
                    if hidden > 0 {
                        hidden -= 1;
                    } else if block_gap && is_block_tag(el.name()) {
                        out.push(' ');
                    }
                }
            }
        }
    }
}

fn is_leaf_block(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    is_block_tag(name) && !is_protected_tag(name) && !has_block_descendant(element)
}

fn has_block_descendant(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| is_block_tag(el.value().name()))
}

/// An element being segmented: its remaining children and the pending inline run.
struct SegmentFrame<'d> {
    children: Children<'d, Node>,
    run: Vec<NodeRef<'d, Node>>,
}

impl<'d> SegmentFrame<'d> {
    fn new(element: ElementRef<'d>) -> Self {
        Self {
            children: element.children(),
            run: Vec::new(),
        }
    }
}

/// Splits the members of a top node into paragraphs and filters them.
pub struct Formatter<'a> {
    config: &'a Config,
    options: &'a Options,
}

impl<'a> Formatter<'a> {
    pub fn new(config: &'a Config, options: &'a Options) -> Self {
        Self { config, options }
    }

    /// The surviving paragraphs of the top node, in document order.
    pub fn paragraphs(&self, top: &TopNode, doc: &Html) -> Vec<Paragraph> {
        let mut all = Vec::new();
        for member in top.elements(doc) {
            self.segment(member, &mut all);
        }
        let total = all.len();
        let kept = filter_paragraphs(all, self.options);
        debug!(total, kept = kept.len(), "formatted paragraphs");
        kept
    }

    /// Segment one element. Leaf blocks become a single paragraph; anything
    /// else is walked child by child, nested blocks in document order.
    fn segment<'d>(&self, element: ElementRef<'d>, out: &mut Vec<Paragraph>) {
        if is_leaf_block(element) {
            out.push(self.leaf(element));
            return;
        }

        let mut stack = vec![SegmentFrame::new(element)];
        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.children.next() else {
                self.flush(&mut frame.run, out);
                stack.pop();
                continue;
            };
            match child.value() {
                Node::Element(el) if el.name() == "br" => self.flush(&mut frame.run, out),
                Node::Element(el) if is_block_tag(el.name()) => {
                    self.flush(&mut frame.run, out);
                    if let Some(block) = ElementRef::wrap(child) {
                        if is_leaf_block(block) {
                            out.push(self.leaf(block));
                        } else {
                            stack.push(SegmentFrame::new(block));
                        }
                    }
                }
                Node::Element(el) if NON_TEXT_TAGS.contains(&el.name()) => {}
                Node::Text(_) | Node::Element(_) => frame.run.push(child),
                _ => {}
            }
        }
    }

    fn leaf(&self, element: ElementRef<'_>) -> Paragraph {
        Paragraph::from_nodes(&[*element], element.html(), &self.config.stopwords)
    }

    fn flush<'b>(&self, run: &mut Vec<NodeRef<'b, Node>>, out: &mut Vec<Paragraph>) {
        if run.is_empty() {
            return;
        }
        let mut html = String::from("<p>");
        for node in run.iter() {
            serialize_node(*node, &mut html);
        }
        html.push_str("</p>");

        let paragraph = Paragraph::from_nodes(run, html, &self.config.stopwords);
        run.clear();
        if !paragraph.is_empty() {
            out.push(paragraph);
        }
    }
}

/// Drop empty, link-heavy and short paragraphs.
///
/// The length floor never empties the output on its own: when every
/// remaining paragraph is short they are all kept.
pub fn filter_paragraphs(paragraphs: Vec<Paragraph>, options: &Options) -> Vec<Paragraph> {
    let candidates: Vec<Paragraph> = paragraphs
        .into_iter()
        .filter(|p| !p.is_empty() && p.link_density <= options.output_link_density)
        .collect();

    let long: Vec<Paragraph> = candidates
        .iter()
        .filter(|p| p.len() >= options.min_paragraph_len)
        .cloned()
        .collect();

    if long.is_empty() {
        candidates
    } else {
        long
    }
}

/// Normalized paragraph text, one line per paragraph.
pub fn render_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Paragraph text with its original whitespace, one paragraph per line.
pub fn render_whole_text(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|p| p.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markup of the surviving paragraphs inside a single `<div>`.
pub fn render_html(paragraphs: &[Paragraph]) -> String {
    let mut out = String::from("<div>");
    for p in paragraphs {
        out.push_str(&p.html);
    }
    out.push_str("</div>");
    out
}

/// A standalone fragment holding the surviving paragraphs.
pub fn render_structure(paragraphs: &[Paragraph]) -> Html {
    Html::parse_fragment(&render_html(paragraphs))
}

/// Preprocess HTML before conversion: replace <br> tags with newlines.
fn preprocess_br_tags(html: &str) -> String {
    BR_RE.replace_all(html, "\n").to_string()
}

/// Collapse more than 2 consecutive blank lines to exactly 2.
fn collapse_blank_lines_to_two(text: &str) -> String {
    BLANK_LINES_RE.replace_all(text, "\n\n").to_string()
}

/// Convert HTML to Markdown using htmd.
///
/// On conversion error, returns the preprocessed HTML unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = preprocess_br_tags(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.clone());

    collapse_blank_lines_to_two(&md).trim().to_string()
}

/// Markdown rendition of the surviving paragraphs.
pub fn render_markdown(paragraphs: &[Paragraph]) -> String {
    html_to_markdown(&render_html(paragraphs))
}

/// All document text as it appears, script and style contents excluded.
pub fn whole_text(doc: &Html) -> String {
    let mut out = String::new();
    collect_raw_text(*doc.root_element(), &mut out);
    out
}

/// All document text with whitespace normalized.
pub fn text(doc: &Html) -> String {
    let mut out = String::new();
    collect_text(*doc.root_element(), &mut out, true);
    normalize_spaces(&out)
}
