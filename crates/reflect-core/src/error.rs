// ── Core error taxonomy ──
//
// Consumer-facing errors. Transport and mapping failures inside the
// refresh engine never surface here directly -- they are formatted into
// the error sets and batched onto the next facade call as `Unreachable`.
// The `From<reflect_api::Error>` impl translates API-layer errors into
// the taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Network or HTTP failure against the Reflect cloud.
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// Malformed payload or mapping-table failure.
    #[error("Mapping failure: {message}")]
    Mapping { message: String },

    /// Missing or invalid token, or invalid configuration value.
    /// Always reported synchronously to the caller that triggered it.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An expected nested field was absent in a way that changes
    /// semantics (e.g. a record without a `status` object).
    #[error("Upstream payload inconsistency: {message}")]
    UpstreamInconsistency { message: String },

    /// Batched background failures, deduplicated and newline-joined.
    /// Raised at most once per error: surfacing clears the pending set.
    #[error("{message}")]
    Unreachable { message: String },
}

impl CoreError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// ── Conversion from API-layer errors ─────────────────────────────────

impl From<reflect_api::Error> for CoreError {
    fn from(err: reflect_api::Error) -> Self {
        match err {
            reflect_api::Error::MissingToken => CoreError::Configuration {
                message: "API token is empty".into(),
            },
            reflect_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            reflect_api::Error::InvalidUrl(e) => CoreError::Configuration {
                message: format!("invalid URL: {e}"),
            },
            reflect_api::Error::Api { status, body } => CoreError::Transport {
                message: format!("HTTP {status}: {body}"),
            },
            reflect_api::Error::Deserialization { message, body: _ } => CoreError::Mapping {
                message: format!("payload decode failed: {message}"),
            },
            reflect_api::Error::Mapping { message } => CoreError::Mapping { message },
        }
    }
}
