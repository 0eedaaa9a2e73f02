// ── Device domain type ──

use indexmap::IndexMap;

/// Well-known property keys on a [`Device`].
pub mod property {
    /// Free-form device category (`"Core"`, `"Camera"`, ...).
    pub const DEVICE_TYPE: &str = "deviceType";
    /// Latest status message; overwritten from the status side table at
    /// snapshot time.
    pub const STATUS_MESSAGE: &str = "deviceStatusMessage";
    /// Human-readable uptime after snapshot normalization; before that,
    /// may hold a raw seconds duration from the wire.
    pub const UPTIME: &str = "deviceUptime";
    /// Raw started-at timestamp (epoch seconds) from the wire; consumed
    /// and removed by snapshot normalization.
    pub const UPTIME_STARTED_AT: &str = "deviceUptimeStartedAt";
}

/// Synthetic `deviceType` value assigned to top-level `/cores` records,
/// which carry no type field of their own.
pub const CORE_DEVICE_TYPE: &str = "Core";

/// One monitored device, flattened from a vendor payload.
///
/// Owned exclusively by the [`Store`](crate::Store) until cloned for a
/// snapshot; `Clone` deep-copies the property map, so a consumer mutating
/// a snapshot can never corrupt the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Stable identifier from the remote system; unique within one
    /// cache snapshot.
    pub id: String,
    pub model: String,
    pub name: String,
    pub serial_number: String,
    /// Derived from the status message (`"Running"` means online).
    pub online: bool,
    /// Vendor-specific fields in mapping-table order.
    pub properties: IndexMap<String, String>,
}

impl Device {
    /// The device's current status message, if it carries one.
    pub fn status_message(&self) -> Option<&str> {
        self.properties
            .get(property::STATUS_MESSAGE)
            .map(String::as_str)
    }

    /// The device's type property, if it carries one.
    pub fn device_type(&self) -> Option<&str> {
        self.properties
            .get(property::DEVICE_TYPE)
            .map(String::as_str)
    }
}
