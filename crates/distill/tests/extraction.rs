// ABOUTME: Integration tests for the extraction pipeline through the public API.
// ABOUTME: Covers a realistic page, determinism, cleaning idempotence, fallbacks and link listing.

use digests_distill::{
    clean, extract, extract_structure, extract_text, links, text, urls, DensityMetrics,
    Extractor, Link,
};
use pretty_assertions::assert_eq;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::fs;

fn fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/{}.html",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read fixture: {}", path))
}

#[test]
fn news_page_keeps_article_and_drops_clutter() {
    let text = extract_text(fixture("news"));
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4, "got: {}", text);
    assert_eq!(lines[0], "City council approves new park");
    assert!(lines[1].starts_with("The city council voted on Tuesday"));
    assert!(lines[3].starts_with("Construction is expected"));

    for clutter in [
        "Daily Gazette",
        "Sports",
        "Most read",
        "Copyright",
        "future park",
        "Article body follows",
        "analytics",
    ] {
        assert!(!text.contains(clutter), "{} leaked into: {}", clutter, text);
    }
}

#[test]
fn news_page_structure_matches_text() {
    let html = fixture("news");
    let structure = extract_structure(html.as_str());
    let sel = Selector::parse("div > h1, div > p").unwrap();
    let blocks: Vec<String> = structure
        .root_element()
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect();
    assert_eq!(blocks.join("\n"), extract_text(html.as_str()));
}

#[test]
fn simple_article_scenario() {
    let html = r#"<div><h1>Title</h1><p>Sentence one, with a comma.</p><p>Sentence two.</p><nav><a href="/x">Menu</a><a href="/y">Link</a></nav></div>"#;
    assert_eq!(
        extract_text(html),
        "Sentence one, with a comma.\nSentence two."
    );
}

#[test]
fn extraction_is_deterministic() {
    let html = fixture("news");
    let first = extract_text(html.as_str());
    for _ in 0..5 {
        assert_eq!(extract_text(html.as_str()), first);
    }
    assert_eq!(extract(html.as_str()), extract(html.as_str()));
}

#[test]
fn extraction_is_thread_safe() {
    let html = fixture("news");
    let extractor = Extractor::default();
    let expected = extractor.extract_text(html.as_str());

    let shared = &extractor;
    let input = html.as_str();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || shared.extract_text(input)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn single_paragraph_is_never_lost() {
    assert_eq!(extract_text("<p>Hello</p>"), "Hello");
    let article = extract("<p>Hello</p>");
    assert!(article.fallback);
}

#[test]
fn deeply_nested_markup_does_not_exhaust_the_stack() {
    let depth = 20_000;
    let nested = |inner: &str| {
        format!(
            "{}{}{}",
            "<div>".repeat(depth),
            inner,
            "</div>".repeat(depth)
        )
    };

    let html = nested("<p>Deep sentence, with a comma.</p><p>Another one.</p>");
    assert_eq!(
        extract_text(html.as_str()),
        "Deep sentence, with a comma.\nAnother one."
    );

    let article = extract(nested("<p>Hello</p>"));
    assert!(article.fallback);
    assert_eq!(article.text, "Hello");
}

#[test]
fn short_formatted_paragraphs_are_kept() {
    assert_eq!(
        extract_text("<p><em>A short emphasised line.</em></p>"),
        "A short emphasised line."
    );
    assert_eq!(extract_text("<p><b>Hello world</b></p>"), "Hello world");
}

#[test]
fn empty_and_degenerate_inputs_do_not_fail() {
    assert_eq!(extract_text(""), "");
    assert_eq!(extract_text("<p>"), "");
    assert_eq!(extract_text("<div><span></span></div>"), "");
}

#[test]
fn cleaning_is_idempotent() {
    let once = clean(fixture("news"), false);
    let once_html = once.root_element().html();
    let twice = clean(&once, false);
    assert_eq!(twice.root_element().html(), once_html);
}

#[test]
fn cleaning_keeps_long_paragraphs_and_drops_noise() {
    let cleaned = clean(fixture("news"), false);
    let cleaned_text = text(&cleaned);

    assert!(cleaned_text.contains("ending a debate that has lasted for almost three years"));
    assert!(cleaned_text.contains("Copyright 2024 Daily Gazette."));
    assert!(!cleaned_text.contains("analytics"));
    assert!(!cleaned_text.contains("future park"));
    assert!(!cleaned_text.contains("Article body follows"));

    let anchors = Selector::parse("a").unwrap();
    assert_eq!(cleaned.root_element().select(&anchors).count(), 0);
}

#[test]
fn sanitizer_scenario() {
    let cleaned = clean(
        "<script>alert(1)</script><p>Safe text</p><p>and a paragraph with plenty of text</p>",
        false,
    );
    let html = cleaned.root_element().html();
    assert!(!html.contains("alert"));
    assert!(!html.contains("<script"));
    assert!(html.contains("<p>Safe text</p>"));
}

#[test]
fn link_density_is_bounded() {
    let doc = Html::parse_document(&fixture("news"));
    let stopwords = HashSet::new();
    for el in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        let metrics = DensityMetrics::of(el, &stopwords);
        let density = metrics.link_density();
        assert!(
            (0.0..=1.0).contains(&density),
            "{} -> {}",
            el.value().name(),
            density
        );
        if metrics.text_length == 0 {
            assert_eq!(density, 0.0);
        }
    }
}

#[test]
fn lists_links_with_site_filter() {
    let html = fixture("news");
    let all = links(
        html.as_str(),
        "https://gazette.example.com/2024/park",
        false,
        false,
    )
    .unwrap();
    assert_eq!(all.len(), 7);
    assert_eq!(
        all[0],
        Link {
            url: "/".to_string(),
            text: "Daily Gazette".to_string(),
        }
    );

    let off_site: Vec<Link> = all
        .into_iter()
        .filter(|l| !digests_distill::is_same_site(&l.url, "gazette.example.com"))
        .collect();
    assert_eq!(off_site.len(), 1);
    assert_eq!(off_site[0].url, "https://partner.example.org/b");

    let on_site = links(html.as_str(), "https://gazette.example.com/", true, true).unwrap();
    assert_eq!(on_site.len(), 6);
    assert!(on_site
        .iter()
        .all(|l| l.url.starts_with("https://gazette.example.com/")));
}

#[test]
fn urls_are_resolved_against_base() {
    let found = urls(fixture("news"), "https://gazette.example.com/2024/park").unwrap();
    assert_eq!(found[0], "https://gazette.example.com/");
    assert_eq!(found[1], "https://gazette.example.com/news");
    assert!(found.contains(&"https://partner.example.org/b".to_string()));
}

#[test]
fn custom_noise_class_is_removed() {
    let extractor = Extractor::builder()
        .noise_class("sidebar")
        .build()
        .unwrap();
    let cleaned = extractor.clean(fixture("news"), false);
    assert!(!text(&cleaned).contains("Most read"));
}

#[test]
fn custom_paragraph_floor_changes_output() {
    let html = r#"<div><h1>Title</h1><p>Sentence one, with a comma.</p><p>Sentence two.</p></div>"#;
    let extractor = Extractor::builder().min_paragraph_len(3).build().unwrap();
    assert_eq!(
        extractor.extract_text(html),
        "Title\nSentence one, with a comma.\nSentence two."
    );
}
