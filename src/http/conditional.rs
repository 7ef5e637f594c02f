//! Conditional request evaluation
//!
//! Decides whether an `If-Modified-Since` request can be answered with
//! `304 Not Modified`.

use chrono::{DateTime, Utc};
use hyper::header::IF_MODIFIED_SINCE;
use hyper::{HeaderMap, Method};

use super::date::{is_unspecified, DateFormats};

/// Outcome of a modification-time precondition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionVerdict {
    /// The check does not apply to this request
    NoCondition,
    /// The client's cached copy is current
    Unmodified,
    /// The resource changed after the client's copy
    Modified,
}

/// Evaluate `If-Modified-Since` against a resource modification time.
///
/// Only GET and HEAD are eligible. A missing, empty or unparsable header, or an
/// unspecified modification time, yields [`ConditionVerdict::NoCondition`].
/// The modification time is truncated to whole seconds, the precision of
/// `Last-Modified`.
pub fn check_if_modified_since(
    method: &Method,
    headers: &HeaderMap,
    modified: Option<DateTime<Utc>>,
    formats: &DateFormats,
) -> ConditionVerdict {
    if *method != Method::GET && *method != Method::HEAD {
        return ConditionVerdict::NoCondition;
    }
    let Some(header) = headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    else {
        return ConditionVerdict::NoCondition;
    };
    let Some(modified) = modified.filter(|_| !is_unspecified(modified)) else {
        return ConditionVerdict::NoCondition;
    };
    let Some(since) = formats.parse(header) else {
        return ConditionVerdict::NoCondition;
    };

    if modified.timestamp() <= since.timestamp() {
        ConditionVerdict::Unmodified
    } else {
        ConditionVerdict::Modified
    }
}

/// Evaluate `If-Unmodified-Since`: `Some(true)` when the precondition holds,
/// `Some(false)` when it fails, `None` when it does not apply.
pub fn check_if_unmodified_since(
    headers: &HeaderMap,
    modified: Option<DateTime<Utc>>,
    formats: &DateFormats,
) -> Option<bool> {
    let header = headers
        .get(hyper::header::IF_UNMODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())?;
    let modified = modified.filter(|_| !is_unspecified(modified))?;
    let since = formats.parse(header)?;
    Some(modified.timestamp() <= since.timestamp())
}
