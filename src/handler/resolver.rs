//! Resource resolution
//!
//! Opens a cleaned path, enforces canonical URLs with relative 301 redirects,
//! substitutes `index.html` for directories and picks listing or content
//! delivery for what remains.

use hyper::header::{HeaderValue, LAST_MODIFIED};
use hyper::{HeaderMap, Method};

use super::error::ServeError;
use super::listing::{encode_href, listing_response};
use super::normalize::base;
use super::request::RequestView;
use crate::fs::{FileSystem, Resource, ResourceInfo};
use crate::http::date::{format_http_date, is_unspecified};
use crate::http::{
    build_304_response, build_local_redirect, check_if_modified_since, serve_content,
    ConditionVerdict, Content, DateFormats, HttpResponse,
};

const INDEX_PAGE: &str = "/index.html";

/// Resolve `name` (the cleaned path) for `req`, whose `path` is the rooted
/// but otherwise untouched request path.
pub async fn resolve(
    fs: &dyn FileSystem,
    dates: &DateFormats,
    req: &RequestView,
    name: &str,
) -> Result<HttpResponse, ServeError> {
    // `/dir/index.html` is only reachable as `/dir/`
    if req.path.ends_with(INDEX_PAGE) {
        return Ok(build_local_redirect("./", &req.raw_query));
    }

    let (mut resource, mut info) = open_and_stat(fs, name).await?;

    if let Some(target) = canonical_redirect(&req.path, info.is_dir) {
        return Ok(build_local_redirect(&target, &req.raw_query));
    }

    if info.is_dir {
        let index = format!("{}{INDEX_PAGE}", name.trim_end_matches('/'));
        if let Ok((index_resource, index_info)) = open_and_stat(fs, &index).await {
            resource = index_resource;
            info = index_info;
        }
    }

    if info.is_dir {
        return serve_directory(resource.as_ref(), &info, dates, req, name).await;
    }

    let data = resource.read().await.map_err(|source| ServeError::Read {
        path: name.to_string(),
        source,
    })?;
    Ok(serve_content(
        &req.method,
        &req.headers,
        Content {
            name: &info.name,
            modified: info.modified,
            data,
        },
        dates,
    ))
}

async fn open_and_stat(
    fs: &dyn FileSystem,
    path: &str,
) -> Result<(Box<dyn Resource>, ResourceInfo), ServeError> {
    let open_error = |source| ServeError::Open {
        path: path.to_string(),
        source,
    };
    let resource = fs.open(path).await.map_err(open_error)?;
    let info = resource.stat().map_err(open_error)?;
    Ok((resource, info))
}

/// Relative redirect target enforcing a trailing slash on directories and
/// none on files
fn canonical_redirect(url: &str, is_dir: bool) -> Option<String> {
    let has_slash = url.ends_with('/');
    if is_dir && !has_slash {
        Some(format!("{}/", encode_href(base(url))))
    } else if !is_dir && has_slash {
        Some(format!("../{}", encode_href(base(url))))
    } else {
        None
    }
}

async fn serve_directory(
    dir: &dyn Resource,
    info: &ResourceInfo,
    dates: &DateFormats,
    req: &RequestView,
    name: &str,
) -> Result<HttpResponse, ServeError> {
    if check_if_modified_since(&req.method, &req.headers, info.modified, dates)
        == ConditionVerdict::Unmodified
    {
        return Ok(build_304_response(HeaderMap::new()));
    }

    let mut headers = HeaderMap::new();
    if let Some(modified) = info.modified.filter(|_| !is_unspecified(info.modified)) {
        if let Ok(value) = HeaderValue::from_str(&format_http_date(modified)) {
            headers.insert(LAST_MODIFIED, value);
        }
    }

    let entries = dir.read_dir().await.map_err(|source| ServeError::Listing {
        path: name.to_string(),
        source,
    })?;
    Ok(listing_response(entries, headers, req.method == Method::HEAD))
}
