//! Content delivery
//!
//! Turns a named blob of bytes into a full HTTP response: validators,
//! preconditions, MIME typing and single byte ranges.

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCEPT_RANGES, CONTENT_RANGE, CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH,
    IF_RANGE, LAST_MODIFIED, RANGE,
};
use hyper::{HeaderMap, Method, StatusCode};

use super::cache::{check_etag_match, check_strong_match, generate_etag};
use super::conditional::{check_if_modified_since, check_if_unmodified_since, ConditionVerdict};
use super::date::{format_http_date, is_unspecified, DateFormats};
use super::range::{parse_range_header, RangeParseResult};
use super::response::{
    build_304_response, build_412_response, build_416_response, build_with_headers, HttpResponse,
};

/// A file ready to be delivered
pub struct Content<'a> {
    /// Base name, used for MIME detection
    pub name: &'a str,
    pub modified: Option<DateTime<Utc>>,
    pub data: Bytes,
}

/// Precondition outcome for a delivery request
enum Precondition {
    Proceed,
    NotModified,
    Failed,
}

/// Serve `content` for a request with the given method and headers.
pub fn serve_content(
    method: &Method,
    request_headers: &HeaderMap,
    content: Content<'_>,
    formats: &DateFormats,
) -> HttpResponse {
    let etag = generate_etag(&content.data);
    let mut headers = HeaderMap::new();
    if let Some(modified) = content.modified.filter(|_| !is_unspecified(content.modified)) {
        if let Ok(value) = HeaderValue::from_str(&format_http_date(modified)) {
            headers.insert(LAST_MODIFIED, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(ETAG, value);
    }

    match check_preconditions(method, request_headers, &etag, content.modified, formats) {
        Precondition::NotModified => return build_304_response(headers),
        Precondition::Failed => return build_412_response(),
        Precondition::Proceed => {}
    }

    let content_type = super::mime::content_type(content.name, &content.data);
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let is_head = *method == Method::HEAD;
    let total_size = content.data.len();
    let range_header = request_headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .filter(|_| range_applies(request_headers, &etag, content.modified, formats));

    match parse_range_header(range_header, total_size) {
        RangeParseResult::Valid(range) => {
            if let Ok(value) = HeaderValue::from_str(&range.content_range(total_size)) {
                headers.insert(CONTENT_RANGE, value);
            }
            let body = content.data.slice(range.start..=range.end);
            build_with_headers(
                StatusCode::PARTIAL_CONTENT,
                headers,
                body,
                range.len(),
                is_head,
            )
        }
        RangeParseResult::NotSatisfiable => build_416_response(total_size),
        RangeParseResult::None => {
            build_with_headers(StatusCode::OK, headers, content.data, total_size, is_head)
        }
    }
}

fn check_preconditions(
    method: &Method,
    headers: &HeaderMap,
    etag: &str,
    modified: Option<DateTime<Utc>>,
    formats: &DateFormats,
) -> Precondition {
    let if_match = headers.get(IF_MATCH).and_then(|v| v.to_str().ok());
    let match_ok = match if_match {
        Some(value) => check_strong_match(value, etag),
        None => check_if_unmodified_since(headers, modified, formats).unwrap_or(true),
    };
    if !match_ok {
        return Precondition::Failed;
    }

    let is_get_or_head = *method == Method::GET || *method == Method::HEAD;
    if let Some(if_none_match) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) {
        if check_etag_match(Some(if_none_match), etag) {
            return if is_get_or_head {
                Precondition::NotModified
            } else {
                Precondition::Failed
            };
        }
        return Precondition::Proceed;
    }

    match check_if_modified_since(method, headers, modified, formats) {
        ConditionVerdict::Unmodified => Precondition::NotModified,
        ConditionVerdict::Modified | ConditionVerdict::NoCondition => Precondition::Proceed,
    }
}

/// Whether a Range header may be honored given `If-Range`
fn range_applies(
    headers: &HeaderMap,
    etag: &str,
    modified: Option<DateTime<Utc>>,
    formats: &DateFormats,
) -> bool {
    let Some(if_range) = headers.get(IF_RANGE).and_then(|v| v.to_str().ok()) else {
        return true;
    };
    if if_range.starts_with('"') || if_range.starts_with("W/") {
        return check_strong_match(if_range, etag);
    }
    match (modified, formats.parse(if_range)) {
        (Some(modified), Some(date)) if !is_unspecified(Some(modified)) => {
            modified.timestamp() == date.timestamp()
        }
        _ => false,
    }
}
