// Reflect API HTTP client
//
// Wraps `reqwest::Client` with Reflect-specific URL construction and
// response handling. All endpoints are read-only GETs under the public
// API base path; the bearer header is installed by the transport layer.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::SystemRecord;

/// Base path of the Reflect public API, appended to the host URL.
const API_BASE_PATH: &str = "api/public/v0";

/// Raw HTTP client for the Q-SYS Reflect Enterprise Management API.
///
/// `/systems` is decoded into typed [`SystemRecord`]s; `/cores` and
/// `/systems/{id}/items` are returned as raw JSON records for the
/// mapping engine to interpret.
pub struct ReflectClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ReflectClient {
    /// Create a new client from a host URL and bearer token.
    ///
    /// Fails with [`Error::MissingToken`] when the token is empty --
    /// an empty token must never produce a network call.
    pub fn new(
        base_url: Url,
        token: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(token)?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests that want to skip header installation.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The configured host URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List all systems visible to the token.
    ///
    /// `GET /api/public/v0/systems`
    pub async fn list_systems(&self) -> Result<Vec<SystemRecord>, Error> {
        let url = self.api_url("systems")?;
        debug!("listing systems");
        self.get(url).await
    }

    /// List all top-level core devices.
    ///
    /// `GET /api/public/v0/cores` -- raw records for the mapping engine.
    pub async fn list_cores(&self) -> Result<Vec<serde_json::Value>, Error> {
        let url = self.api_url("cores")?;
        debug!("listing cores");
        self.get(url).await
    }

    /// List the inventory items of one system.
    ///
    /// `GET /api/public/v0/systems/{id}/items` -- raw records for the
    /// mapping engine.
    pub async fn list_system_items(&self, system_id: i64) -> Result<Vec<serde_json::Value>, Error> {
        let url = self.api_url(&format!("systems/{system_id}/items"))?;
        debug!(system_id, "listing system items");
        self.get(url).await
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/public/v0/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{API_BASE_PATH}/{path}")).map_err(Error::InvalidUrl)
    }

    /// Send a GET request and decode the JSON array body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
