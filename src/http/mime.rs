//! MIME type detection module
//!
//! Picks a Content-Type from the file name extension, falling back to
//! sniffing the leading bytes of the content.

/// Number of leading bytes considered when sniffing
const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Get the Content-Type for a named resource
///
/// # Examples
/// ```
/// use rust_fileserver::http::mime::content_type;
/// assert_eq!(content_type("index.html", b""), "text/html; charset=utf-8");
/// assert_eq!(content_type("clip.mp4", b""), "video/mp4");
/// assert_eq!(content_type("LICENSE", b"plain words"), "text/plain; charset=utf-8");
/// ```
pub fn content_type(name: &str, data: &[u8]) -> String {
    match mime_guess::from_path(name).first() {
        Some(mime) if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() => {
            format!("{mime}; charset=utf-8")
        }
        Some(mime) => mime.to_string(),
        None => sniff(data).to_string(),
    }
}

/// Detect a Content-Type from content alone
pub fn sniff(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"\xFF\xD8\xFF", "image/jpeg"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1F\x8B\x08", "application/x-gzip"),
        (b"\x00asm", "application/wasm"),
    ];
    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return mime;
    }

    if looks_like_html(head) {
        return TEXT_HTML;
    }

    // Control bytes other than common whitespace mark binary content
    let binary = head
        .iter()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F));
    if binary {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn looks_like_html(head: &[u8]) -> bool {
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let head = &head[start..];

    ["<!doctype html", "<html", "<head", "<body", "<!--"]
        .iter()
        .any(|tag| {
            head.len() >= tag.len() && head[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
        })
}
