// Shared transport configuration for building reqwest::Client instances.
//
// The Reflect cloud API authenticates every request with a bearer token,
// so the token is installed as a default `Authorization` header at client
// build time rather than per request.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying `Authorization: Bearer <token>`
    /// as a default header.
    ///
    /// Fails with [`Error::MissingToken`] when the token is empty — an
    /// unauthenticated request must never leave the process.
    pub fn build_client(&self, token: &SecretString) -> Result<reqwest::Client, Error> {
        let raw = token.expose_secret();
        if raw.trim().is_empty() {
            return Err(Error::MissingToken);
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {raw}"))
            .map_err(|_| Error::MissingToken)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("reflect-api/0.1.0")
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected_locally() {
        let config = TransportConfig::default();
        let token = SecretString::from(String::new());
        assert!(matches!(
            config.build_client(&token),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn whitespace_token_is_rejected_locally() {
        let config = TransportConfig::default();
        let token = SecretString::from("   ".to_string());
        assert!(matches!(
            config.build_client(&token),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn non_empty_token_builds_a_client() {
        let config = TransportConfig::default();
        let token = SecretString::from("57cfe39c35d7df9f".to_string());
        assert!(config.build_client(&token).is_ok());
    }
}
