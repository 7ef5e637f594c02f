// Configuration module entry point
// Loads configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, ContentConfig, ContentSource, GateConfig, LoggingConfig, PerformanceConfig,
    ServerConfig, ValidatorKind,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// The file is optional; environment variables prefixed `FILESERVER__`
    /// override it, e.g. `FILESERVER__SERVER__PORT=8080`
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FILESERVER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gate.tokens")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9121)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 60)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 60)?
            .set_default("performance.shutdown_timeout", 30)?
            .set_default("content.source", "embedded")?
            .set_default("content.root", "static")?
            .set_default("gate.validator", "allow_list")?
            .set_default("gate.tokens", Vec::<String>::new())?
            .set_default("gate.timeout_ms", 3000)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.gate.validator == ValidatorKind::Remote && self.gate.endpoint.is_none() {
            return Err(config::ConfigError::Message(
                "gate.endpoint is required when gate.validator = \"remote\"".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
