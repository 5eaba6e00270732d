// ABOUTME: CLI binary for the distill main-content extraction engine.
// ABOUTME: Reads an HTML file or stdin and prints the article text, markup, links or cleaned document.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{anyhow, bail};
use clap::Parser;
use digests_distill::resource::read_input;
use digests_distill::{ContentType, DistillError, Extractor, Link, Options};
use scraper::Html;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "distill")]
#[command(about = "Extract the main content of an HTML document")]
struct Args {
    /// HTML file to read; `-` or nothing reads stdin
    #[arg()]
    file: Option<PathBuf>,

    /// Output format: text (default), html, markdown/md
    #[arg(short = 'f', long = "format", default_value = "text")]
    format: String,

    /// Output the extraction result as JSON
    #[arg(long = "json")]
    json_output: bool,

    /// Print the cleaned, sanitized document instead of the extracted article
    #[arg(long = "clean")]
    clean: bool,

    /// Keep hyperlink markup when cleaning
    #[arg(long = "keep-links")]
    keep_links: bool,

    /// List the document's links as `url<TAB>text` lines (requires --base-url)
    #[arg(long = "links")]
    links: bool,

    /// Absolute URL of the document, used by --links
    #[arg(long = "base-url")]
    base_url: Option<String>,

    /// Only list links pointing at the base URL's site or its subdomains
    #[arg(long = "on-site")]
    on_site: bool,

    /// Resolve listed links against the base URL
    #[arg(long = "absolute")]
    absolute: bool,

    /// JSON file with extraction thresholds
    #[arg(long = "options")]
    options: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_options(path: &Path) -> anyhow::Result<Options> {
    let raw = fs::read_to_string(path)
        .map_err(|e| DistillError::io(path.display().to_string(), "read", Some(e.into())))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid options file {}: {}", path.display(), e))
}

fn format_links(links: &[Link], json_output: bool) -> anyhow::Result<String> {
    if json_output {
        return Ok(serde_json::to_string_pretty(links)?);
    }
    Ok(links
        .iter()
        .map(|link| format!("{}\t{}", link.url, link.text))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_cleaned(doc: &Html, content_type: ContentType) -> String {
    let body = digests_distill::dom::body_or_root(doc);
    match content_type {
        ContentType::Html => body.inner_html(),
        ContentType::Markdown => digests_distill::formats::html_to_markdown(&body.inner_html()),
        ContentType::Text => digests_distill::formats::text(doc),
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let mut builder = Extractor::builder();
    if let Some(path) = &args.options {
        builder = builder.options(load_options(path)?);
    }
    let extractor = builder.build()?;

    let html = read_input(args.file.as_deref())?;
    let content_type = ContentType::from(args.format.as_str());

    if args.links {
        let Some(base) = args.base_url.as_deref() else {
            bail!("--links requires --base-url");
        };
        let links = digests_distill::links(html.as_str(), base, args.on_site, args.absolute)?;
        return format_links(&links, args.json_output);
    }

    if args.clean {
        let cleaned = extractor.clean(html.as_str(), args.keep_links);
        return Ok(format_cleaned(&cleaned, content_type));
    }

    let article = extractor.extract(html.as_str());
    if args.json_output {
        return Ok(serde_json::to_string_pretty(&article)?);
    }
    Ok(article.format(content_type))
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let start = Instant::now();
    let result = run(&args);
    let elapsed = start.elapsed();

    let mut had_error = false;
    match result {
        Ok(output_str) => {
            if let Some(output_path) = &args.output {
                if let Err(e) = fs::write(output_path, &output_str) {
                    eprintln!("error writing to {:?}: {}", output_path, e);
                    had_error = true;
                }
            } else {
                println!("{}", output_str);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            had_error = true;
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
