//! Request failures and their client-facing form

use hyper::StatusCode;
use thiserror::Error;

use crate::fs::FsError;

/// A failure that terminates a request
///
/// The `Display` form carries internal detail for the log. Clients only ever
/// see `status()` and `public_message()`.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("read directory {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: FsError,
    },
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: FsError,
    },
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => match source {
                FsError::NotFound => StatusCode::NOT_FOUND,
                FsError::PermissionDenied => StatusCode::FORBIDDEN,
                FsError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Listing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Listing { .. } => "Error reading directory",
            _ => match self.status() {
                StatusCode::NOT_FOUND => "404 page not found",
                StatusCode::FORBIDDEN => "403 Forbidden",
                _ => "500 Internal Server Error",
            },
        }
    }
}
