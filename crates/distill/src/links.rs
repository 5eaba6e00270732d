// ABOUTME: Link listing over a document with same-site classification and URL resolution.
// ABOUTME: Independent of scoring; walks every a[href] in document order.

use scraper::{ElementRef, Html};
use serde::Serialize;
use tracing::warn;
use url::{ParseError, Url};

use crate::dom::normalize_spaces;
use crate::error::{DistillError, Result};

/// One hyperlink: its target and its visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// Parse a base location, requiring an absolute URL with a host.
pub fn parse_base(base: &str, op: &str) -> Result<Url> {
    let url = Url::parse(base.trim())
        .map_err(|e| DistillError::invalid_url(base, op, Some(e.into())))?;
    if url.host_str().is_none() {
        return Err(DistillError::invalid_url(
            base,
            op,
            Some(anyhow::anyhow!("base URL has no host")),
        ));
    }
    Ok(url)
}

/// Resolve `href` against `base`. Returns None when the result is not a valid URL.
pub fn resolve_absolute(href: &str, base: &Url) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// Does `link` point at `base_host` or one of its subdomains?
///
/// Root-relative paths, fragments and document-relative references stay
/// on the site. Protocol-relative and absolute links are judged by host;
/// links without a host (mailto:, data:) and unparseable ones are not
/// same-site.
pub fn is_same_site(link: &str, base_host: &str) -> bool {
    let link = link.trim();
    if link.starts_with('#') || (link.starts_with('/') && !link.starts_with("//")) {
        return true;
    }

    let parsed = if link.starts_with("//") {
        Url::parse(&format!("http:{}", link))
    } else {
        Url::parse(link)
    };

    match parsed {
        Ok(url) => url
            .host_str()
            .map(|host| host_matches(host, base_host))
            .unwrap_or(false),
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

fn host_matches(host: &str, base_host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let base = base_host.trim().to_ascii_lowercase();
    if base.is_empty() {
        return false;
    }
    host == base || host.ends_with(&format!(".{}", base))
}

fn anchors(doc: &Html) -> impl Iterator<Item = (ElementRef<'_>, &str)> {
    doc.tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|el| el.value().attr("href").map(|href| (el, href)))
}

/// List every `a[href]` in document order.
///
/// `absolute` resolves each href against `base`; hrefs that cannot be
/// resolved are skipped. `on_site_only` keeps only same-site links.
pub fn links(doc: &Html, base: &str, on_site_only: bool, absolute: bool) -> Result<Vec<Link>> {
    let base_url = parse_base(base, "links")?;
    let base_host = base_url.host_str().unwrap_or_default();

    let mut out = Vec::new();
    for (anchor, href) in anchors(doc) {
        let url = if absolute {
            match resolve_absolute(href, &base_url) {
                Some(url) => url,
                None => {
                    warn!(href, "skipping link that does not resolve");
                    continue;
                }
            }
        } else {
            href.trim().to_string()
        };

        if on_site_only && !is_same_site(&url, base_host) {
            continue;
        }

        out.push(Link {
            url,
            text: normalize_spaces(&anchor.text().collect::<String>()),
        });
    }
    Ok(out)
}

/// Absolute URLs of every `a[href]`, in document order.
pub fn urls(doc: &Html, base: &str) -> Result<Vec<String>> {
    Ok(links(doc, base, false, true)?
        .into_iter()
        .map(|link| link.url)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<p>
        <a href="/about">About  us</a>
        <a href="https://blog.example.com/post">Blog</a>
        <a href="https://other.com/x">Elsewhere</a>
        <a href="mailto:me@example.com">Mail</a>
        <a>No href</a>
    </p>"#;

    #[test]
    fn test_same_site_classification() {
        assert!(is_same_site("/about", "example.com"));
        assert!(is_same_site("#top", "example.com"));
        assert!(is_same_site("https://blog.example.com/post", "example.com"));
        assert!(is_same_site("https://EXAMPLE.com/", "example.com"));
        assert!(!is_same_site("https://other.com/x", "example.com"));
    }

    #[test]
    fn test_same_site_edge_cases() {
        assert!(is_same_site("page.html", "example.com"));
        assert!(is_same_site("//cdn.example.com/a.js", "example.com"));
        assert!(!is_same_site("//other.com/a.js", "example.com"));
        assert!(!is_same_site("https://notexample.com/", "example.com"));
        assert!(!is_same_site("mailto:me@example.com", "example.com"));
        assert!(!is_same_site("http://[::1", "example.com"));
    }

    #[test]
    fn test_resolve_absolute() {
        let base = Url::parse("https://example.com/a/b.html").unwrap();
        assert_eq!(
            resolve_absolute("c.html", &base).as_deref(),
            Some("https://example.com/a/c.html")
        );
        assert_eq!(
            resolve_absolute("/x", &base).as_deref(),
            Some("https://example.com/x")
        );
        assert_eq!(
            resolve_absolute("https://other.com/", &base).as_deref(),
            Some("https://other.com/")
        );
    }

    #[test]
    fn test_links_in_document_order() {
        let doc = Html::parse_document(PAGE);
        let all = links(&doc, "https://example.com/", false, false).unwrap();
        let urls: Vec<&str> = all.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/about",
                "https://blog.example.com/post",
                "https://other.com/x",
                "mailto:me@example.com",
            ]
        );
        assert_eq!(all[0].text, "About us");
    }

    #[test]
    fn test_links_on_site_and_absolute() {
        let doc = Html::parse_document(PAGE);
        let on_site = links(&doc, "https://example.com/", true, true).unwrap();
        assert_eq!(
            on_site,
            vec![
                Link {
                    url: "https://example.com/about".to_string(),
                    text: "About us".to_string(),
                },
                Link {
                    url: "https://blog.example.com/post".to_string(),
                    text: "Blog".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_invalid_base_is_error() {
        let doc = Html::parse_document(PAGE);
        let err = links(&doc, "not a url", false, false).unwrap_err();
        assert!(err.is_invalid_url());
        let err = urls(&doc, "mailto:me@example.com").unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_urls_are_absolute() {
        let doc = Html::parse_document(r#"<a href="x">x</a><a href="/y">y</a>"#);
        assert_eq!(
            urls(&doc, "https://example.com/dir/").unwrap(),
            vec!["https://example.com/dir/x", "https://example.com/y"]
        );
    }
}
