//! HTML directory listing

use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::fs::ChildEntry;
use crate::http::response::build_with_headers;
use crate::http::HttpResponse;

/// Bytes left literal in link targets: RFC 3986 unreserved plus the path
/// separator. Anything that could end the path (`?`, `#`) or be read as an
/// escape (`%`) or a scheme (`:`) is encoded.
const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode a relative path for use as a link or redirect target
pub fn encode_href(path: &str) -> String {
    utf8_percent_encode(path, HREF).to_string()
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a listing: one link per entry inside a `<pre>` block, sorted by
/// name (byte order), directories suffixed with `/`.
pub fn render_listing(mut entries: Vec<ChildEntry>) -> String {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut html = String::with_capacity(16 + entries.len() * 64);
    html.push_str("<pre>\n");
    for entry in &entries {
        let mut name = entry.name.clone();
        if entry.is_dir {
            name.push('/');
        }
        html.push_str("<a href=\"");
        html.push_str(&encode_href(&name));
        html.push_str("\">");
        html.push_str(&escape_html(&name));
        html.push_str("</a>\n");
    }
    html.push_str("</pre>\n");
    html
}

/// Wrap a rendered listing into a response; `headers` carries anything
/// already set, such as `Last-Modified`.
pub fn listing_response(
    entries: Vec<ChildEntry>,
    mut headers: HeaderMap,
    is_head: bool,
) -> HttpResponse {
    let body = Bytes::from(render_listing(entries));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    let length = body.len();
    build_with_headers(StatusCode::OK, headers, body, length, is_head)
}
