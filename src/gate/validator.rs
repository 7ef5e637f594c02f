//! Token validation backends

use async_trait::async_trait;
use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::header::AUTHORIZATION;
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{GateConfig, ValidatorKind};

/// Why a token was not accepted
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected")]
    Rejected,
    #[error("verification endpoint answered {0}")]
    Status(hyper::StatusCode),
    #[error("verification request failed: {0}")]
    Transport(String),
    #[error("verification timed out after {0:?}")]
    Timeout(Duration),
}

/// Decides whether an access token is valid
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn check(&self, token: &str) -> Result<(), TokenError>;
}

/// Accepts tokens from a fixed list
#[derive(Debug, Default)]
pub struct AllowListValidator {
    tokens: HashSet<String>,
}

impl AllowListValidator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl TokenValidator for AllowListValidator {
    async fn check(&self, token: &str) -> Result<(), TokenError> {
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(TokenError::Rejected)
        }
    }
}

/// Asks an HTTP endpoint: `GET endpoint` with `Authorization: Bearer <token>`,
/// any 2xx answer accepts the token.
pub struct RemoteValidator {
    endpoint: Uri,
    timeout: Duration,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl RemoteValidator {
    pub fn new(endpoint: Uri, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

#[async_trait]
impl TokenValidator for RemoteValidator {
    async fn check(&self, token: &str) -> Result<(), TokenError> {
        let request = Request::get(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Empty::<Bytes>::new())
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| TokenError::Timeout(self.timeout))?
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TokenError::Status(response.status()))
        }
    }
}

/// Build the validator selected by configuration
pub fn from_config(config: &GateConfig) -> Result<Arc<dyn TokenValidator>, String> {
    match config.validator {
        ValidatorKind::AllowList => Ok(Arc::new(AllowListValidator::new(config.tokens.clone()))),
        ValidatorKind::Remote => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or("gate.endpoint is not set")?
                .parse::<Uri>()
                .map_err(|e| format!("Invalid gate.endpoint: {e}"))?;
            Ok(Arc::new(RemoteValidator::new(
                endpoint,
                Duration::from_millis(config.timeout_ms),
            )))
        }
    }
}
