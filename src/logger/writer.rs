//! Log writer module
//!
//! Builds the non-blocking sinks behind the tracing layers: an append-only
//! file when a path is configured, stdout/stderr otherwise.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Fallback stream when no file is configured
#[derive(Debug, Clone, Copy)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Create a non-blocking writer; the guard must live as long as logging
/// should be flushed.
pub fn make_writer(path: Option<&str>, fallback: Stream) -> io::Result<(NonBlocking, WorkerGuard)> {
    Ok(match path {
        Some(path) => tracing_appender::non_blocking(open_log_file(path)?),
        None => match fallback {
            Stream::Stdout => tracing_appender::non_blocking(io::stdout()),
            Stream::Stderr => tracing_appender::non_blocking(io::stderr()),
        },
    })
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<std::fs::File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
