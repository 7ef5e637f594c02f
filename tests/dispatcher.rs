use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, IF_MODIFIED_SINCE, LAST_MODIFIED, LOCATION, RANGE,
};
use hyper::{Method, Request, StatusCode};
use std::sync::Arc;
use url::Url;

use rust_fileserver::fs::{ChildEntry, FileSystem, FsError, MemoryFs, Resource, ResourceInfo};
use rust_fileserver::gate::{AccessGate, AllowListValidator};
use rust_fileserver::handler::{Dispatcher, RequestView};
use rust_fileserver::http::HttpResponse;

const STAMP: &str = "Sat, 06 May 2023 07:08:09 GMT";

fn site() -> MemoryFs {
    MemoryFs::builder()
        .modified(Utc.with_ymd_and_hms(2023, 5, 6, 7, 8, 9).unwrap())
        .file("/index.html", "<h1>home</h1>")
        .file("/401.html", "<h1>unauthorized</h1>")
        .file("/404.html", "<h1>not found</h1>")
        .file("/docs/a.txt", "alpha")
        .file("/docs/B.txt", "bravo")
        .file("/docs/sub/c.txt", "charlie")
        .file("/docs/<odd> & \"q?\".txt", "odd")
        .file("/site/index.html", "<p>site</p>")
        .file("/my dir/x.txt", "x")
        .file("/100%/y.txt", "y")
        .build()
}

fn dispatcher_for(fs: Arc<dyn FileSystem>) -> Dispatcher {
    Dispatcher::new(
        fs,
        AccessGate::new(Arc::new(AllowListValidator::new(["letmein"]))),
    )
}

fn dispatcher() -> Dispatcher {
    dispatcher_for(Arc::new(site()))
}

fn with_header(mut req: RequestView, name: hyper::header::HeaderName, value: &str) -> RequestView {
    req.headers
        .insert(name, HeaderValue::from_str(value).unwrap());
    req
}

async fn body(response: HttpResponse) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &HttpResponse) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn root_serves_index_document() {
    let response = dispatcher().handle(RequestView::get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(response.headers()[LAST_MODIFIED], STAMP);
    assert_eq!(body(response).await, "<h1>home</h1>");
}

#[tokio::test]
async fn missing_path_is_generic_404() {
    let response = dispatcher().handle(RequestView::get("/nope/secret.txt")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(body(response).await, "404 page not found\n");
}

#[tokio::test]
async fn directory_without_slash_redirects() {
    let response = dispatcher().handle(RequestView::get("/docs")).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "docs/");

    let response = dispatcher().handle(RequestView::get("/docs/sub?x=1&y=2")).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "sub/?x=1&y=2");
}

#[tokio::test]
async fn file_with_slash_redirects() {
    let response = dispatcher().handle(RequestView::get("/docs/a.txt/?v=3")).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "../a.txt?v=3");
}

/// Build a view the way the hyper adapter does, from a raw request target
fn parsed(target: &str) -> RequestView {
    RequestView::from_request(&Request::get(target).body(()).unwrap())
}

#[tokio::test]
async fn canonical_redirects_settle_after_one_hop() {
    let base = Url::parse("http://files.test/").unwrap();
    for target in [
        "/docs",
        "/docs/sub?x=1",
        "/my%20dir",
        "/100%25",
        "/docs/a.txt/",
        "/my%20dir/x.txt/?v=2",
    ] {
        let response = dispatcher().handle(parsed(target)).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY, "{target}");

        let next = base.join(target).unwrap().join(location(&response)).unwrap();
        let next_target = match next.query() {
            Some(query) => format!("{}?{query}", next.path()),
            None => next.path().to_string(),
        };
        let response = dispatcher().handle(parsed(&next_target)).await;
        assert_eq!(response.status(), StatusCode::OK, "{target} -> {next_target}");
    }
}

#[tokio::test]
async fn index_suffix_redirects_before_open() {
    let response = dispatcher()
        .handle(RequestView::get("/site/index.html?lang=en"))
        .await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "./?lang=en");

    // checked before the filesystem is consulted
    let response = dispatcher()
        .handle(RequestView::get("/ghost/index.html"))
        .await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "./");
}

#[tokio::test]
async fn directory_with_index_serves_it() {
    let response = dispatcher().handle(RequestView::get("/site/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, "<p>site</p>");
}

#[tokio::test]
async fn directory_listing_is_sorted_and_escaped() {
    let response = dispatcher().handle(RequestView::get("/docs/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(response.headers()[LAST_MODIFIED], STAMP);
    assert_eq!(
        body(response).await,
        "<pre>\n\
         <a href=\"%3Codd%3E%20%26%20%22q%3F%22.txt\">&lt;odd&gt; &amp; &#34;q?&#34;.txt</a>\n\
         <a href=\"B.txt\">B.txt</a>\n\
         <a href=\"a.txt\">a.txt</a>\n\
         <a href=\"sub/\">sub/</a>\n\
         </pre>\n"
    );
}

#[tokio::test]
async fn unmodified_directory_gets_304() {
    let req = with_header(RequestView::get("/docs/"), IF_MODIFIED_SINCE, STAMP);
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(!response.headers().contains_key(CONTENT_TYPE));
    assert!(!response.headers().contains_key(CONTENT_LENGTH));
    assert_eq!(body(response).await, "");

    let req = with_header(
        RequestView::get("/docs/"),
        IF_MODIFIED_SINCE,
        "Fri, 05 May 2023 07:08:09 GMT",
    );
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn legacy_date_formats_are_accepted() {
    for stamp in [
        "Saturday, 06-May-23 07:08:09 GMT",
        "Sat May  6 07:08:09 2023",
    ] {
        let req = with_header(RequestView::get("/docs/"), IF_MODIFIED_SINCE, stamp);
        let response = dispatcher().handle(req).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED, "{stamp}");
    }
}

#[tokio::test]
async fn mismatched_weekday_still_matches() {
    // 6 May 2023 was a Saturday
    let req = with_header(
        RequestView::get("/docs/"),
        IF_MODIFIED_SINCE,
        "Mon, 06 May 2023 07:08:09 GMT",
    );
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn unparsable_condition_is_ignored() {
    let req = with_header(RequestView::get("/docs/"), IF_MODIFIED_SINCE, "yesterday");
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unmodified_file_gets_304() {
    let req = with_header(RequestView::get("/docs/a.txt"), IF_MODIFIED_SINCE, STAMP);
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(!response.headers().contains_key(CONTENT_TYPE));
}

#[tokio::test]
async fn directory_without_mtime_has_no_condition() {
    let fs = MemoryFs::builder().file("/d/x.txt", "x").build();
    let req = with_header(RequestView::get("/d/"), IF_MODIFIED_SINCE, STAMP);
    let response = dispatcher_for(Arc::new(fs)).handle(req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(LAST_MODIFIED));
}

#[tokio::test]
async fn token_flow_redirects() {
    let response = dispatcher()
        .handle(RequestView::get("/docs/a.txt?token=letmein"))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
    assert_eq!(body(response).await, "");

    let response = dispatcher()
        .handle(RequestView::get("/docs/a.txt?token=wrong"))
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/401.html");

    let response = dispatcher()
        .handle(RequestView::get("/docs/a.txt?token="))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // a malformed escape drops the pair, so there is no token at all
    let response = dispatcher()
        .handle(RequestView::get("/docs/a.txt?token=%zz"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, "alpha");
}

#[tokio::test]
async fn sentinel_pages_carry_their_status() {
    let response = dispatcher().handle(RequestView::get("/401.html")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(response).await, "<h1>unauthorized</h1>");

    let response = dispatcher()
        .handle(RequestView::get("/docs/../404.html"))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(response).await, "<h1>not found</h1>");
}

#[tokio::test]
async fn head_omits_body() {
    let mut req = RequestView::get("/docs/a.txt");
    req.method = Method::HEAD;
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_LENGTH], "5");
    assert_eq!(body(response).await, "");
}

#[tokio::test]
async fn byte_range_is_served() {
    let req = with_header(RequestView::get("/docs/a.txt"), RANGE, "bytes=1-3");
    let response = dispatcher().handle(req).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(body(response).await, "lph");
}

/// Filesystem whose failures are scripted per path
struct FaultyFs;

struct UnreadableDir;

#[async_trait]
impl Resource for UnreadableDir {
    fn stat(&self) -> Result<ResourceInfo, FsError> {
        Ok(ResourceInfo {
            name: "broken".to_string(),
            is_dir: true,
            modified: None,
        })
    }

    async fn read_dir(&self) -> Result<Vec<ChildEntry>, FsError> {
        Err(FsError::Other(std::io::Error::other("bad sector")))
    }

    async fn read(&self) -> Result<Bytes, FsError> {
        Err(FsError::Other(std::io::Error::other("is a directory")))
    }
}

#[async_trait]
impl FileSystem for FaultyFs {
    async fn open(&self, path: &str) -> Result<Box<dyn Resource>, FsError> {
        match path {
            "/broken" => Ok(Box::new(UnreadableDir)),
            "/private" => Err(FsError::PermissionDenied),
            "/flaky" => Err(FsError::Other(std::io::Error::other("device gone"))),
            _ => Err(FsError::NotFound),
        }
    }
}

#[tokio::test]
async fn listing_failure_is_500() {
    let response = dispatcher_for(Arc::new(FaultyFs))
        .handle(RequestView::get("/broken/"))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body(response).await;
    assert_eq!(text, "Error reading directory\n");
}

#[tokio::test]
async fn open_failures_map_to_generic_errors() {
    let d = dispatcher_for(Arc::new(FaultyFs));

    let response = d.handle(RequestView::get("/private")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(response).await, "403 Forbidden\n");

    let response = d.handle(RequestView::get("/flaky")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body(response).await;
    assert_eq!(text, "500 Internal Server Error\n");
    assert!(!text.contains("device gone"));
}
