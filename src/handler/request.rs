//! Immutable snapshot of the request parts the dispatcher reads

use hyper::{HeaderMap, Method, Request};
use percent_encoding::percent_decode_str;

#[derive(Debug, Clone)]
pub struct RequestView {
    pub method: Method,
    /// Percent-decoded URL path
    pub path: String,
    /// Query string exactly as received, without the `?`
    pub raw_query: String,
    pub headers: HeaderMap,
}

impl RequestView {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let uri = req.uri();
        Self {
            method: req.method().clone(),
            path: percent_decode_str(uri.path())
                .decode_utf8_lossy()
                .into_owned(),
            raw_query: uri.query().unwrap_or_default().to_string(),
            headers: req.headers().clone(),
        }
    }

    /// Convenience for tests and programmatic callers: a GET for `target`
    /// (path plus optional query)
    pub fn get(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: Method::GET,
            path: path.to_string(),
            raw_query: query.to_string(),
            headers: HeaderMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request_decodes_path() {
        let req = Request::get("/my%20docs/a%3Fb.txt?x=%20y")
            .body(())
            .unwrap();
        let view = RequestView::from_request(&req);
        assert_eq!(view.method, Method::GET);
        assert_eq!(view.path, "/my docs/a?b.txt");
        assert_eq!(view.raw_query, "x=%20y");
    }

    #[test]
    fn test_get_helper() {
        let view = RequestView::get("/dir?token=abc");
        assert_eq!(view.path, "/dir");
        assert_eq!(view.raw_query, "token=abc");

        let view = RequestView::get("/plain");
        assert_eq!(view.raw_query, "");
    }
}
