// ABOUTME: Allow-list HTML sanitization backed by ammonia.
// ABOUTME: SanitizePolicy describes the safelist; sanitize() rebuilds a document from it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::dom::body_or_root;
use crate::error::{DistillError, Result};

const SAFE_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd", "div",
    "dl", "dt", "em", "h1", "h2", "h3", "h4", "h5", "h6", "i", "p", "pre", "q", "small",
    "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u",
];

const SAFE_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("blockquote", &["cite"]),
    ("col", &["span", "width"]),
    ("colgroup", &["span", "width"]),
    ("q", &["cite"]),
    ("table", &["summary", "width"]),
    ("td", &["abbr", "axis", "colspan", "rowspan", "width"]),
    ("th", &["abbr", "axis", "colspan", "rowspan", "scope", "width"]),
];

/// The allow-list applied by [`sanitize`].
///
/// Anything outside it is removed: disallowed tags are unwrapped (their
/// text stays), except `strip_content_tags`, which go with their contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizePolicy {
    pub allowed_tags: BTreeSet<String>,
    pub allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    pub url_schemes: BTreeSet<String>,
    pub strip_content_tags: BTreeSet<String>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            allowed_tags: SAFE_TAGS.iter().map(|t| (*t).to_string()).collect(),
            allowed_attributes: SAFE_ATTRIBUTES
                .iter()
                .map(|(tag, attrs)| {
                    (
                        (*tag).to_string(),
                        attrs.iter().map(|a| (*a).to_string()).collect(),
                    )
                })
                .collect(),
            url_schemes: ["http", "https"].iter().map(|s| (*s).to_string()).collect(),
            strip_content_tags: ["script", "style"].iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl SanitizePolicy {
    /// Reject policies that would allow nothing, or that ammonia refuses
    /// (a tag both allowed and stripped with its contents).
    pub fn validate(&self) -> Result<()> {
        if self.allowed_tags.is_empty() {
            return Err(DistillError::config(
                "sanitize",
                "sanitize allow-list is empty",
            ));
        }
        if let Some(tag) = self.allowed_tags.intersection(&self.strip_content_tags).next() {
            return Err(DistillError::config(
                "sanitize",
                format!("tag {} is both allowed and stripped", tag),
            ));
        }
        Ok(())
    }

    /// Tags stripped with their contents are never also allowed, whether or
    /// not the policy was validated.
    fn builder(&self, keep_links: bool) -> ammonia::Builder<'_> {
        let keep = |tag: &&String| {
            (keep_links || tag.as_str() != "a") && !self.strip_content_tags.contains(*tag)
        };

        let tags: HashSet<&str> = self
            .allowed_tags
            .iter()
            .filter(|tag| keep(tag))
            .map(String::as_str)
            .collect();
        let attributes: HashMap<&str, HashSet<&str>> = self
            .allowed_attributes
            .iter()
            .filter(|(tag, _)| keep(tag))
            .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
            .collect();

        let mut builder = ammonia::Builder::empty();
        builder
            .tags(tags)
            .tag_attributes(attributes)
            .clean_content_tags(self.strip_content_tags.iter().map(String::as_str).collect())
            .url_schemes(self.url_schemes.iter().map(String::as_str).collect())
            .link_rel(None);
        builder
    }
}

/// Sanitize the document body against `policy` and reparse the result.
///
/// With `keep_links` false, `<a>` is dropped from the allow-list so link
/// markup disappears while its text stays.
pub fn sanitize(doc: &Html, policy: &SanitizePolicy, keep_links: bool) -> Html {
    let body = body_or_root(doc).inner_html();
    let cleaned = policy.builder(keep_links).clean(&body).to_string();
    Html::parse_document(&cleaned)
}

/// Sanitize a markup string with the default policy.
pub fn sanitize_html(html: &str, keep_links: bool) -> String {
    let doc = Html::parse_document(html);
    body_or_root(&sanitize(&doc, &SanitizePolicy::default(), keep_links)).inner_html()
}
