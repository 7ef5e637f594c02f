//! HTTP response building module
//!
//! Provides builders for the responses the file server emits, decoupled from
//! request resolution.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED, LOCATION,
    X_CONTENT_TYPE_OPTIONS,
};
use hyper::{HeaderMap, Response, StatusCode};

/// Response type produced throughout the server
pub type HttpResponse = Response<Full<Bytes>>;

/// Build 301 Moved Permanently response to a relative target
///
/// The target is sent as given; clients resolve it against the request URL.
/// A non-empty raw query is appended unchanged.
pub fn build_local_redirect(target: &str, raw_query: &str) -> HttpResponse {
    let location = if raw_query.is_empty() {
        target.to_string()
    } else {
        format!("{target}?{raw_query}")
    };

    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 307 Temporary Redirect response with no body
pub fn build_temporary_redirect(target: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, target)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("307", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a plain-text error response carrying only a generic message
pub fn build_error_response(status: StatusCode, message: &str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(Bytes::from(format!("{message}\n"))))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response from the headers gathered so far
///
/// Representation metadata is dropped; `Last-Modified` only survives when no
/// `ETag` is available to guide cache updates.
pub fn build_304_response(mut headers: HeaderMap) -> HttpResponse {
    headers.remove(CONTENT_TYPE);
    headers.remove(CONTENT_LENGTH);
    if headers.contains_key(ETAG) {
        headers.remove(LAST_MODIFIED);
    }

    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    *response.headers_mut() = headers;
    response
}

/// Build 412 Precondition Failed response
pub fn build_412_response() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::PRECONDITION_FAILED;
    response
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_size: usize) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("Content-Range", format!("bytes */{total_size}"))
        .body(Full::new(Bytes::from("invalid range: failed to overlap\n")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a response with prepared headers
///
/// `Content-Length` is set from `length`; the body is dropped for HEAD.
pub fn build_with_headers(
    status: StatusCode,
    mut headers: HeaderMap,
    body: Bytes,
    length: usize,
    is_head: bool,
) -> HttpResponse {
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    let body = if is_head { Bytes::new() } else { body };

    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
