// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub content: ContentConfig,
    pub gate: GateConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration, all timeouts in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    pub shutdown_timeout: u64,
}

impl PerformanceConfig {
    /// Upper bound on the lifetime of a single connection
    pub fn connection_timeout(&self) -> u64 {
        self.read_timeout.max(self.write_timeout)
    }
}

/// Where served content comes from
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// Assets compiled into the binary
    Embedded,
    /// A directory on disk, see `ContentConfig::root`
    Directory,
}

/// Content configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub source: ContentSource,
    pub root: String,
}

/// Token validator selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    AllowList,
    Remote,
}

/// Access gate configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GateConfig {
    pub validator: ValidatorKind,
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Verification endpoint for the remote validator
    #[serde(default)]
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
}
