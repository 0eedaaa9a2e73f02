// ── Aggregator configuration ──
//
// Built by the embedder and handed in -- core never reads config files.
// Filter strings are parsed into typed criteria when the aggregator is
// constructed, not at apply time.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Floor for the metadata retrieval timeout. Values below this would
/// refetch the device list too frequently.
pub const MIN_METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one [`ReflectAggregator`](crate::ReflectAggregator).
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Reflect cloud host (e.g. `https://reflect.qsc.com`).
    pub base_url: Url,
    /// Bearer token for the Reflect public API.
    pub api_token: SecretString,
    /// Comma-separated device models to keep; empty disables.
    pub filter_model: String,
    /// Comma-separated device status messages to keep; empty disables.
    pub filter_device_status_message: String,
    /// Comma-separated device types to keep; empty disables.
    pub filter_type: String,
    /// Comma-separated system names to fan out to; empty disables.
    pub filter_system_name: String,
    /// How long fetched metadata stays fresh before the next top-level
    /// fetch. Floored at [`MIN_METADATA_TIMEOUT`].
    pub device_metadata_retrieval_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl AggregatorConfig {
    /// The effective metadata timeout, never below the floor.
    pub fn metadata_timeout(&self) -> Duration {
        self.device_metadata_retrieval_timeout
            .max(MIN_METADATA_TIMEOUT)
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://reflect.qsc.com").expect("static URL"),
            api_token: SecretString::from(String::new()),
            filter_model: String::new(),
            filter_device_status_message: String::new(),
            filter_type: String::new(),
            filter_system_name: String::new(),
            device_metadata_retrieval_timeout: MIN_METADATA_TIMEOUT,
            request_timeout: Duration::from_secs(30),
        }
    }
}
