// ── Per-system summary statistics ──
//
// Flattens the system list into one string->string map keyed
// `"{systemName}#{Metric}"`. Optional wire fields that were absent omit
// their metric instead of reporting zero.

use std::collections::HashMap;

use crate::model::{Device, SystemInfo};
use crate::uptime::normalize_elapsed;

/// Separator between the system name and the metric name.
const METRIC_SEPARATOR: &str = "#";

/// Metric names reported for each system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMetric {
    SystemId,
    SystemCode,
    SystemStatus,
    AlertsNormal,
    AlertsWarning,
    AlertsFault,
    AlertsUnknown,
    DesignName,
    DesignPlatform,
    Uptime,
    CoreName,
    Model,
}

impl SystemMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SystemId => "SystemId",
            Self::SystemCode => "SystemCode",
            Self::SystemStatus => "SystemStatus",
            Self::AlertsNormal => "AlertsNormal",
            Self::AlertsWarning => "AlertsWarning",
            Self::AlertsFault => "AlertsFault",
            Self::AlertsUnknown => "AlertsUnknown",
            Self::DesignName => "DesignName",
            Self::DesignPlatform => "DesignPlatform",
            Self::Uptime => "Uptime",
            Self::CoreName => "CoreName",
            Self::Model => "Model",
        }
    }
}

/// Build the flattened summary map for all cached systems.
///
/// The `Model` metric resolves through the `Device.name == core_name`
/// join. The join has no uniqueness guarantee; on collision the last
/// matching device wins, and an unresolved join omits the metric.
pub fn build_system_stats(
    systems: &[SystemInfo],
    devices: &[Device],
    now_epoch_millis: i64,
) -> HashMap<String, String> {
    let mut stats = HashMap::new();

    for system in systems {
        let mut put = |metric: SystemMetric, value: String| {
            stats.insert(
                format!("{}{METRIC_SEPARATOR}{}", system.name, metric.as_str()),
                value,
            );
        };

        put(SystemMetric::SystemId, system.id.to_string());
        put(SystemMetric::SystemCode, system.code.clone());
        put(SystemMetric::SystemStatus, system.status_message.clone());

        if let Some(alerts) = system.alerts {
            put(SystemMetric::AlertsNormal, alerts.normal.to_string());
            put(SystemMetric::AlertsWarning, alerts.warning.to_string());
            put(SystemMetric::AlertsFault, alerts.fault.to_string());
            put(SystemMetric::AlertsUnknown, alerts.unknown.to_string());
        }

        if let Some(name) = &system.design_name {
            put(SystemMetric::DesignName, name.clone());
        }
        if let Some(platform) = &system.design_platform {
            put(SystemMetric::DesignPlatform, platform.clone());
        }

        if let Some(started_millis) = system.uptime_epoch_millis {
            let elapsed_secs = (now_epoch_millis - started_millis) / 1000;
            put(SystemMetric::Uptime, normalize_elapsed(elapsed_secs));
        }

        if let Some(core_name) = &system.core_name {
            put(SystemMetric::CoreName, core_name.clone());

            // Best-effort join; last match wins on name collision.
            let model = devices
                .iter()
                .rev()
                .find(|device| &device.name == core_name)
                .map(|device| device.model.clone());
            if let Some(model) = model {
                put(SystemMetric::Model, model);
            }
        }
    }

    stats
}
