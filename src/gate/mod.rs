//! Query-token access gate
//!
//! A request carrying `?token=...` never receives content: a valid token is
//! redirected to `/`, an invalid one to the unauthorized page.

pub mod validator;

pub use validator::{AllowListValidator, RemoteValidator, TokenError, TokenValidator};

use std::sync::Arc;

use crate::handler::normalize::UNAUTHORIZED_PATH;
use crate::http::{build_temporary_redirect, HttpResponse};
use crate::logger;

/// Outcome of inspecting a request's token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    NoToken,
    Accepted,
    Rejected,
}

impl GateVerdict {
    /// Redirect that terminates the request, if any
    pub fn redirect(self) -> Option<HttpResponse> {
        match self {
            Self::NoToken => None,
            Self::Accepted => Some(build_temporary_redirect("/")),
            Self::Rejected => Some(build_temporary_redirect(UNAUTHORIZED_PATH)),
        }
    }
}

#[derive(Clone)]
pub struct AccessGate {
    validator: Arc<dyn TokenValidator>,
}

impl AccessGate {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    pub async fn inspect(&self, raw_query: &str) -> GateVerdict {
        let Some(token) = token_param(raw_query) else {
            return GateVerdict::NoToken;
        };

        match self.validator.check(&token).await {
            Ok(()) => GateVerdict::Accepted,
            Err(TokenError::Rejected) => GateVerdict::Rejected,
            Err(e) => {
                logger::log_warning(&format!("Token validation failed: {e}"));
                GateVerdict::Rejected
            }
        }
    }
}

/// First `token` value of the query, form-decoded; empty counts as absent.
///
/// Pairs containing `;` or a malformed `%` escape are skipped entirely.
fn token_param(raw_query: &str) -> Option<String> {
    raw_query
        .split('&')
        .filter(|pair| !pair.contains(';') && well_escaped(pair))
        .flat_map(|pair| url::form_urlencoded::parse(pair.as_bytes()))
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Every `%` is followed by two hex digits
fn well_escaped(pair: &str) -> bool {
    let bytes = pair.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        })
}
