//! Request path normalization
//!
//! Pure string transforms over `/`-separated URL paths. Nothing here touches
//! the filesystem.

use hyper::StatusCode;

/// Page served for rejected tokens
pub const UNAUTHORIZED_PATH: &str = "/401.html";
/// Page served for missing content
pub const NOT_FOUND_PATH: &str = "/404.html";

/// Prefix `/` when the path is not rooted
pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Lexically clean a rooted path
///
/// Collapses duplicate slashes, drops `.` segments, resolves `..` against the
/// preceding segment (never climbing above the root) and removes any trailing
/// slash. The result always starts with `/`.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Last element of a path, ignoring trailing slashes
///
/// An empty path yields `.`, a path of only slashes yields `/`.
pub fn base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Status pre-set for reserved sentinel pages
pub fn sentinel_status(clean: &str) -> Option<StatusCode> {
    match clean {
        UNAUTHORIZED_PATH => Some(StatusCode::UNAUTHORIZED),
        NOT_FOUND_PATH => Some(StatusCode::NOT_FOUND),
        _ => None,
    }
}
