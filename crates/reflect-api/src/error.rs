use thiserror::Error;

/// Top-level error type for the `reflect-api` crate.
///
/// Covers every failure mode at the API boundary: authentication
/// preconditions, transport, non-2xx responses, payload decoding, and
/// mapping-table evaluation. `reflect-core` maps these into its own
/// domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token is empty. Checked before a client is ever built,
    /// so no request leaves the process without credentials.
    #[error("API token is empty")]
    MissingToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response from the Reflect API.
    #[error("Reflect API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Mapping table could not be loaded or applied to a payload.
    #[error("Mapping error: {message}")]
    Mapping { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if the remote rejected our credentials.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}
