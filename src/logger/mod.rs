//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support
//!
//! Everything goes through `tracing`. Access lines use their own target and
//! sink so they can be split from diagnostics.

mod format;
pub mod writer;

pub use format::{client_ip, AccessLogEntry};

use crate::config::Config;
use std::net::SocketAddr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use writer::{make_writer, Stream};

/// Target carrying access log lines
pub const ACCESS_TARGET: &str = "access";

/// Keeps the background log writers alive; drop at shutdown to flush.
#[must_use = "logs are lost once the guards are dropped"]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`.
pub fn init(config: &Config) -> std::io::Result<LogGuards> {
    let (access_writer, access_guard) =
        make_writer(config.logging.access_log_file.as_deref(), Stream::Stdout)?;
    let (error_writer, error_guard) =
        make_writer(config.logging.error_log_file.as_deref(), Stream::Stderr)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let access_layer = fmt::layer()
        .with_writer(access_writer)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    let app_layer = fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(filter_fn(|meta| meta.target() != ACCESS_TARGET))
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(access_layer)
        .with(app_layer)
        .try_init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e))?;

    Ok(LogGuards {
        _guards: vec![access_guard, error_guard],
    })
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("File server started, listening on http://{addr}");
    tracing::info!(
        "Content source: {:?} ({})",
        config.content.source,
        config.content.root
    );
    tracing::info!("Token validator: {:?}", config.gate.validator);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    if let Some(ref path) = config.logging.error_log_file {
        tracing::info!("Error log: {path}");
    }
}

pub fn log_shutdown_started(active: usize) {
    tracing::info!("Shutdown signal received, draining {active} connection(s)");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("All connections closed, server stopped");
    } else {
        tracing::warn!("Shutdown timeout reached with {remaining} connection(s) still open");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("Accepted connection from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
