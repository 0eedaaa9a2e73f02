// ── Filter pipeline ──
//
// Filters compose as a logical AND across dimensions and a logical OR
// across the accepted values within one dimension. Each comma-separated
// configuration string is parsed exactly once into a typed value; apply
// time never re-splits strings.

use crate::model::{Device, SystemInfo};

/// One filter dimension: the set of accepted values, in configuration
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFilter {
    values: Vec<String>,
}

impl ValueFilter {
    /// Parse a comma-separated filter string.
    ///
    /// Returns `None` (dimension disabled) for the empty string and for
    /// strings consisting only of commas and whitespace -- the `","`
    /// placeholder some configuration UIs emit. Individual segments are
    /// trimmed; empty segments are dropped. Parsing is total: every
    /// input has a defined meaning.
    pub fn parse(raw: &str) -> Option<Self> {
        let values: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(Self { values })
        }
    }

    /// `true` if the candidate equals any accepted value.
    pub fn matches(&self, candidate: &str) -> bool {
        self.values.iter().any(|value| value == candidate)
    }

    /// The accepted values, in configuration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Up to four independent optional dimensions. A `None` dimension places
/// no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub models: Option<ValueFilter>,
    pub status_messages: Option<ValueFilter>,
    pub device_types: Option<ValueFilter>,
    pub system_names: Option<ValueFilter>,
}

impl FilterCriteria {
    /// Build criteria from the four raw configuration strings.
    pub fn parse(
        filter_model: &str,
        filter_status_message: &str,
        filter_type: &str,
        filter_system_name: &str,
    ) -> Self {
        Self {
            models: ValueFilter::parse(filter_model),
            status_messages: ValueFilter::parse(filter_status_message),
            device_types: ValueFilter::parse(filter_type),
            system_names: ValueFilter::parse(filter_system_name),
        }
    }

    /// Apply the three device-level dimensions sequentially
    /// (model AND status message AND type).
    pub fn apply_to_devices(&self, devices: Vec<Device>) -> Vec<Device> {
        let devices = by_model(devices, self.models.as_ref());
        let devices = by_status_message(devices, self.status_messages.as_ref());
        by_type(devices, self.device_types.as_ref())
    }

    /// `true` if a device survives all three device-level dimensions.
    pub fn accepts_device(&self, device: &Device) -> bool {
        matches_model(device, self.models.as_ref())
            && matches_status_message(device, self.status_messages.as_ref())
            && matches_type(device, self.device_types.as_ref())
    }
}

// ── Pure per-dimension functions ─────────────────────────────────────

/// Keep devices whose model equals any accepted value. Disabled filter
/// is the identity.
pub fn by_model(devices: Vec<Device>, filter: Option<&ValueFilter>) -> Vec<Device> {
    match filter {
        None => devices,
        Some(f) => devices
            .into_iter()
            .filter(|device| f.matches(&device.model))
            .collect(),
    }
}

/// Keep devices whose status-message property equals any accepted value.
pub fn by_status_message(devices: Vec<Device>, filter: Option<&ValueFilter>) -> Vec<Device> {
    match filter {
        None => devices,
        Some(f) => devices
            .into_iter()
            .filter(|device| device.status_message().is_some_and(|m| f.matches(m)))
            .collect(),
    }
}

/// Keep devices whose type property equals any accepted value.
pub fn by_type(devices: Vec<Device>, filter: Option<&ValueFilter>) -> Vec<Device> {
    match filter {
        None => devices,
        Some(f) => devices
            .into_iter()
            .filter(|device| device.device_type().is_some_and(|t| f.matches(t)))
            .collect(),
    }
}

/// Keep systems whose name equals any accepted value. Applied before the
/// device-level dimensions: it restricts which systems get their detail
/// inventory fetched at all.
pub fn by_system_name(systems: Vec<SystemInfo>, filter: Option<&ValueFilter>) -> Vec<SystemInfo> {
    match filter {
        None => systems,
        Some(f) => systems
            .into_iter()
            .filter(|system| f.matches(&system.name))
            .collect(),
    }
}

fn matches_model(device: &Device, filter: Option<&ValueFilter>) -> bool {
    filter.is_none_or(|f| f.matches(&device.model))
}

fn matches_status_message(device: &Device, filter: Option<&ValueFilter>) -> bool {
    filter.is_none_or(|f| device.status_message().is_some_and(|m| f.matches(m)))
}

fn matches_type(device: &Device, filter: Option<&ValueFilter>) -> bool {
    filter.is_none_or(|f| device.device_type().is_some_and(|t| f.matches(t)))
}
