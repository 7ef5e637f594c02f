// Application state module
// Shared, read-only state handed to every connection

use std::io;
use std::sync::Arc;

use super::types::Config;
use crate::fs::{self, FileSystem};
use crate::gate::{validator, AccessGate};
use crate::handler::Dispatcher;

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Build the filesystem backend and token validator named by `config`
    pub fn new(config: &Config) -> io::Result<Self> {
        let fs = fs::from_config(&config.content)?;
        let validator = validator::from_config(&config.gate)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(Self::with_parts(config, fs, AccessGate::new(validator)))
    }

    /// Assemble state around an existing filesystem and gate
    pub fn with_parts(config: &Config, fs: Arc<dyn FileSystem>, gate: AccessGate) -> Self {
        Self {
            config: config.clone(),
            dispatcher: Dispatcher::new(fs, gate),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
