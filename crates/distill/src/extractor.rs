// ABOUTME: The Extractor that runs the Clean, Score, Select and Render pipeline over one document.
// ABOUTME: Also exposes the standalone cleaning stage and the Article result type.

use std::sync::Arc;

use scraper::Html;
use serde::Serialize;
use tracing::debug;

use crate::dom::candidates::{select_top_node, TopNode};
use crate::dom::cleaners::{apply_rule, clean_document, CleanRule};
use crate::dom::scoring::score_content;
use crate::dom::IntoDocument;
use crate::formats::{
    html_to_markdown, render_html, render_structure, render_text, render_whole_text, Formatter,
    Paragraph,
};
use crate::options::{Config, ContentType, ExtractorBuilder, Options, DEFAULT_CONFIG};
use crate::sanitize::sanitize;

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Paragraph text, whitespace normalized, one paragraph per line.
    pub text: String,
    /// Paragraph text with the document's own whitespace.
    pub whole_text: String,
    /// Markup of the surviving paragraphs inside a single `<div>`.
    pub html: String,
    pub top_score: f64,
    /// Number of sibling subtrees merged into the top node, the winner included.
    pub merged: usize,
    /// True when nothing scored and the whole body was used.
    pub fallback: bool,
    pub paragraphs: usize,
}

impl Article {
    /// The extracted structure as a standalone fragment.
    pub fn structure(&self) -> Html {
        Html::parse_fragment(&self.html)
    }

    pub fn format_markdown(&self) -> String {
        html_to_markdown(&self.html)
    }

    /// Render the article in the requested content type.
    pub fn format(&self, content_type: ContentType) -> String {
        match content_type {
            ContentType::Html => self.html.clone(),
            ContentType::Markdown => self.format_markdown(),
            ContentType::Text => self.text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Main-content extractor. Cheap to clone; the word and tag sets are shared.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: Arc<Config>,
    options: Options,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_parts(Arc::clone(&DEFAULT_CONFIG), Options::default())
    }
}

impl Extractor {
    /// Create an ExtractorBuilder for custom configuration.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    pub(crate) fn from_parts(config: Arc<Config>, options: Options) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Clean, score and select, returning the top node and its surviving
    /// paragraphs.
    fn run(&self, input: impl IntoDocument) -> (TopNode, Vec<Paragraph>) {
        let mut doc = input.into_document();
        clean_document(&mut doc, &self.config, &self.options);
        let scores = score_content(&doc, &self.config, &self.options);
        let top = select_top_node(&scores, &doc, &self.config, &self.options);
        let paragraphs = Formatter::new(&self.config, &self.options).paragraphs(&top, &doc);
        (top, paragraphs)
    }

    /// Run the full pipeline and return every rendition with diagnostics.
    pub fn extract(&self, input: impl IntoDocument) -> Article {
        let (top, paragraphs) = self.run(input);
        Article {
            text: render_text(&paragraphs),
            whole_text: render_whole_text(&paragraphs),
            html: render_html(&paragraphs),
            top_score: top.score,
            merged: top.len(),
            fallback: top.fallback,
            paragraphs: paragraphs.len(),
        }
    }

    /// Main content as text: normalized paragraphs joined with `\n`.
    pub fn extract_text(&self, input: impl IntoDocument) -> String {
        let (_, paragraphs) = self.run(input);
        render_text(&paragraphs)
    }

    /// Main content as text with the document's whitespace preserved.
    pub fn extract_whole_text(&self, input: impl IntoDocument) -> String {
        let (_, paragraphs) = self.run(input);
        render_whole_text(&paragraphs)
    }

    /// Main content as a standalone fragment with a single `<div>` holding
    /// the surviving paragraphs.
    pub fn extract_structure(&self, input: impl IntoDocument) -> Html {
        let (_, paragraphs) = self.run(input);
        render_structure(&paragraphs)
    }

    /// The cleaning stage alone: noise removal, sanitization, then the
    /// block length floor.
    ///
    /// With `keep_links` false hyperlink markup is stripped and only the
    /// link text remains.
    pub fn clean(&self, input: impl IntoDocument, keep_links: bool) -> Html {
        let mut doc = input.into_document();
        let noise_tags = apply_rule(&mut doc, CleanRule::NoiseTag, &self.config, &self.options);
        let noise_classes =
            apply_rule(&mut doc, CleanRule::NoiseClass, &self.config, &self.options);

        let mut clean = sanitize(&doc, &self.config.sanitize, keep_links);
        let empty_blocks =
            apply_rule(&mut clean, CleanRule::LengthFloor, &self.config, &self.options);

        debug!(
            noise_tags,
            noise_classes,
            empty_blocks,
            keep_links,
            "cleaned document for output"
        );
        clean
    }
}
