// ABOUTME: Main library entry point for the distill main-content extraction engine.
// ABOUTME: Re-exports the public API and offers free functions backed by a default Extractor.

//! Distill - main-content extraction for arbitrary HTML.
//!
//! The engine prunes structural noise from a parsed document, scores the
//! remaining text-bearing nodes, picks the container holding the article
//! body and renders it as clean paragraph text or as a cleaned sub-tree.
//! No site-specific rules are involved and nothing here touches the network.
//!
//! # Example
//!
//! ```
//! let html = r#"<div><h1>Title</h1><p>Sentence one, with a comma.</p>
//!     <p>Sentence two.</p><nav><a href="/x">Menu</a></nav></div>"#;
//! assert_eq!(
//!     digests_distill::extract_text(html),
//!     "Sentence one, with a comma.\nSentence two."
//! );
//! ```

pub mod dom;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod links;
pub mod options;
pub mod resource;
pub mod sanitize;
pub mod stopwords;

use once_cell::sync::Lazy;
use scraper::Html;

pub use crate::dom::candidates::TopNode;
pub use crate::dom::cleaners::CleanReport;
pub use crate::dom::density::DensityMetrics;
pub use crate::dom::IntoDocument;
pub use crate::error::{DistillError, ErrorCode, Result};
pub use crate::extractor::{Article, Extractor};
pub use crate::formats::Paragraph;
pub use crate::links::{is_same_site, resolve_absolute, Link};
pub use crate::options::{Config, ContentType, ExtractorBuilder, Options};
pub use crate::sanitize::SanitizePolicy;

static DEFAULT_EXTRACTOR: Lazy<Extractor> = Lazy::new(Extractor::default);

/// Main content of `input` as paragraph text joined with `\n`.
pub fn extract_text(input: impl IntoDocument) -> String {
    DEFAULT_EXTRACTOR.extract_text(input)
}

/// Main content of `input` as a standalone fragment.
pub fn extract_structure(input: impl IntoDocument) -> Html {
    DEFAULT_EXTRACTOR.extract_structure(input)
}

/// Main content with diagnostics, using the default configuration.
pub fn extract(input: impl IntoDocument) -> Article {
    DEFAULT_EXTRACTOR.extract(input)
}

/// The cleaning stage alone with the default configuration.
pub fn clean(input: impl IntoDocument, keep_links: bool) -> Html {
    DEFAULT_EXTRACTOR.clean(input, keep_links)
}

/// Every `a[href]` of the document as `(url, text)` pairs.
pub fn links(
    input: impl IntoDocument,
    base: &str,
    on_site_only: bool,
    absolute: bool,
) -> Result<Vec<Link>> {
    crate::links::links(&input.into_document(), base, on_site_only, absolute)
}

/// Absolute URLs of every `a[href]`, resolved against `base`.
pub fn urls(input: impl IntoDocument, base: &str) -> Result<Vec<String>> {
    crate::links::urls(&input.into_document(), base)
}

/// All text of the document with whitespace normalized.
pub fn text(input: impl IntoDocument) -> String {
    crate::formats::text(&input.into_document())
}

/// All text of the document as it appears.
pub fn whole_text(input: impl IntoDocument) -> String {
    crate::formats::whole_text(&input.into_document())
}
