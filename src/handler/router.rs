//! HTTP entry point
//!
//! Adapts hyper requests to the dispatcher and writes the access log.

use hyper::body::Body as _;
use hyper::header::{LOCATION, REFERER, USER_AGENT};
use hyper::{Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::request::RequestView;
use crate::config::AppState;
use crate::http::HttpResponse;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let view = RequestView::from_request(&req);

    if !state.access_log_enabled() {
        return Ok(state.dispatcher.handle(view).await);
    }

    let mut entry = AccessLogEntry::new(
        logger::client_ip(req.headers(), peer_addr),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(&req, REFERER.as_str());
    entry.user_agent = header_string(&req, USER_AGENT.as_str());

    let response = state.dispatcher.handle(view).await;

    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, &state.config.logging.access_log_format);

    Ok(response)
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fs::MemoryFs;
    use crate::gate::{AccessGate, AllowListValidator};
    use hyper::StatusCode;

    fn state() -> Arc<AppState> {
        let config = Config::load_from("/nonexistent/fileserver-config").unwrap();
        let fs = MemoryFs::builder().file("/hello.txt", "hello").build();
        let gate = AccessGate::new(Arc::new(AllowListValidator::default()));
        Arc::new(AppState::with_parts(&config, Arc::new(fs), gate))
    }

    #[tokio::test]
    async fn test_handle_request_serves_file() {
        let req = Request::get("/hello.txt").body(()).unwrap();
        let response = handle_request(req, state(), None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handle_request_decodes_path() {
        let req = Request::get("/hello%2Etxt").body(()).unwrap();
        let response = handle_request(req, state(), "127.0.0.1:1".parse().ok())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
    }
}
