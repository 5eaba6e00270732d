// ABOUTME: Input handling for the CLI: reads files or stdin and decodes bytes to text.
// ABOUTME: Charset comes from a byte-order mark, a <meta> declaration, or chardetng detection.

use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

use crate::error::{DistillError, Result};

/// How far into the document a charset declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Decode raw document bytes to a String.
///
/// A byte-order mark wins, then a `<meta charset>` (or http-equiv
/// content-type) declaration near the top, then chardetng's guess.
pub fn decode_html(body: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        debug!(encoding = encoding.name(), "charset from byte-order mark");
        let (decoded, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return decoded.into_owned();
    }

    if let Some(declared) = extract_meta_charset(body).and_then(|c| Encoding::for_label(&c)) {
        // A document that can declare its charset in ASCII is not UTF-16;
        // output_encoding maps UTF-16 and the replacement encoding to UTF-8.
        let encoding = declared.output_encoding();
        debug!(
            declared = declared.name(),
            encoding = encoding.name(),
            "charset from meta declaration"
        );
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    debug!(encoding = encoding.name(), "charset from detection");
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract the charset label declared in a `<meta>` tag near the top of the document.
fn extract_meta_charset(body: &[u8]) -> Option<Vec<u8>> {
    let head = &body[..body.len().min(META_SNIFF_LEN)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_bytes().to_ascii_lowercase())
}

/// Read a document from a file, or from stdin when `path` is None or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    let mut bytes = Vec::new();
    match path {
        Some(p) if p.as_os_str() != "-" => {
            bytes = std::fs::read(p).map_err(|e| {
                DistillError::io(p.display().to_string(), "read", Some(e.into()))
            })?;
        }
        _ => {
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| DistillError::io("<stdin>", "read", Some(e.into())))?;
        }
    }
    Ok(decode_html(&bytes))
}
