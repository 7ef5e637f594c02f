//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from request
//! resolution: header dates, validators, ranges, MIME typing and response
//! builders, plus the content delivery primitive that combines them.

pub mod cache;
pub mod conditional;
pub mod content;
pub mod date;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use conditional::{check_if_modified_since, ConditionVerdict};
pub use content::{serve_content, Content};
pub use date::DateFormats;
pub use response::{
    build_304_response, build_error_response, build_local_redirect, build_temporary_redirect,
    HttpResponse,
};
