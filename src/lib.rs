//! File server serving a read-only virtual filesystem over HTTP/1.1
//!
//! The request path is gated by an optional query token, normalized,
//! resolved against the filesystem with canonical relative redirects, and
//! answered with either a directory listing or the file content.

pub mod config;
pub mod fs;
pub mod gate;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
