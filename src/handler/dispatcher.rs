//! Request dispatch
//!
//! Composes the access gate, path normalization, sentinel statuses and
//! resource resolution into the single `handle` entry point.

use hyper::StatusCode;
use std::sync::Arc;

use super::error::ServeError;
use super::normalize::{clean_path, ensure_leading_slash, sentinel_status};
use super::request::RequestView;
use super::resolver;
use crate::fs::FileSystem;
use crate::gate::AccessGate;
use crate::http::{build_error_response, DateFormats, HttpResponse};
use crate::logger;

/// Serves one virtual filesystem. Holds no per-request state and is shared by
/// all connections.
pub struct Dispatcher {
    fs: Arc<dyn FileSystem>,
    gate: AccessGate,
    dates: DateFormats,
}

impl Dispatcher {
    pub fn new(fs: Arc<dyn FileSystem>, gate: AccessGate) -> Self {
        Self {
            fs,
            gate,
            dates: DateFormats::http(),
        }
    }

    pub async fn handle(&self, mut req: RequestView) -> HttpResponse {
        if let Some(redirect) = self.gate.inspect(&req.raw_query).await.redirect() {
            return redirect;
        }

        req.path = ensure_leading_slash(&req.path);
        let name = clean_path(&req.path);
        let sentinel = sentinel_status(&name);

        let mut response = match resolver::resolve(self.fs.as_ref(), &self.dates, &req, &name).await
        {
            Ok(response) => response,
            Err(e) => {
                log_serve_error(&e);
                return build_error_response(e.status(), e.public_message());
            }
        };

        // sentinel pages keep their content but not a success status
        if let Some(status) = sentinel {
            if response.status() == StatusCode::OK {
                *response.status_mut() = status;
            }
        }
        response
    }
}

fn log_serve_error(e: &ServeError) {
    if e.status().is_server_error() {
        logger::log_error(&e.to_string());
    } else {
        logger::log_debug(&e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use crate::gate::AllowListValidator;
    use hyper::header::LOCATION;

    fn dispatcher(fs: MemoryFs) -> Dispatcher {
        Dispatcher::new(
            Arc::new(fs),
            AccessGate::new(Arc::new(AllowListValidator::new(["ok"]))),
        )
    }

    #[tokio::test]
    async fn test_relative_path_gets_leading_slash() {
        let d = dispatcher(MemoryFs::builder().file("/a.txt", "a").build());
        let mut req = RequestView::get("/a.txt");
        req.path = "a.txt".to_string();
        assert_eq!(d.handle(req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_traversal_stays_inside_root() {
        let d = dispatcher(MemoryFs::builder().file("/etc/passwd", "inside").build());
        let response = d.handle(RequestView::get("/../../etc/passwd")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gate_runs_first() {
        let d = dispatcher(MemoryFs::builder().build());
        let response = d.handle(RequestView::get("/missing?token=ok")).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[LOCATION], "/");
    }

    #[tokio::test]
    async fn test_sentinel_does_not_mask_redirects() {
        let d = dispatcher(MemoryFs::builder().file("/404.html", "gone").build());
        let response = d.handle(RequestView::get("/404.html/")).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "../404.html");
    }
}
