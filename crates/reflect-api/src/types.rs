// Wire types for the Reflect public API.
//
// Only `/systems` gets a typed representation -- `/cores` and
// `/systems/{id}/items` payloads stay as raw `serde_json::Value` records
// because their shape is interpreted by the mapping tables, not by serde.
//
// Several fields are absent on older server versions. Every one of those
// is an `Option` with `#[serde(default)]`: absence deserializes cleanly
// and the derived statistic is simply omitted downstream.

use serde::Deserialize;

/// One entry of the `GET /systems` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemRecord {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub status: SystemStatus,
    #[serde(default)]
    pub design: Option<DesignRecord>,
    #[serde(default)]
    pub core: Option<CoreRecord>,
}

/// Nested `status` object of a system record.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    pub message: String,
    #[serde(default)]
    pub details: Option<StatusDetails>,
}

/// Nested `status.details` object; `items` carries the alert counters.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDetails {
    #[serde(default)]
    pub items: Option<AlertItems>,
}

/// Alert counters under `status.details.items`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AlertItems {
    pub normal: i64,
    pub warning: i64,
    pub fault: i64,
    pub unknown: i64,
}

/// Nested `design` object of a system record.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    /// Epoch milliseconds of when the running design started.
    #[serde(default)]
    pub uptime: Option<i64>,
}

/// Nested `core` object linking a system to its core device by name.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreRecord {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn full_record_deserializes() {
        let raw = serde_json::json!({
            "id": 9468,
            "code": "3-440F59FA6034C59670FF3C0928929607",
            "name": "AVISPL Test Core110f",
            "status": {
                "message": "Running",
                "details": { "items": { "normal": 15, "warning": 0, "fault": 0, "unknown": 0 } }
            },
            "design": { "name": "CeeSalt_TestCore_v3.1", "platform": "Core 110f", "uptime": 1_640_000_000_000_i64 },
            "core": { "name": "CeeSalt-Core110f" }
        });

        let record: SystemRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id, 9468);
        assert_eq!(record.status.message, "Running");
        let items = record.status.details.unwrap().items.unwrap();
        assert_eq!(items.normal, 15);
        assert_eq!(record.design.unwrap().platform.as_deref(), Some("Core 110f"));
        assert_eq!(record.core.unwrap().name.as_deref(), Some("CeeSalt-Core110f"));
    }

    #[test]
    fn absent_optional_fields_do_not_fail() {
        // Older server versions omit details, design, and core entirely.
        let raw = serde_json::json!({
            "id": 10028,
            "code": "3-06AC3AB31F07DD0118B29EE65183499E",
            "name": "Base Classroom",
            "status": { "message": "Running", "details": null }
        });

        let record: SystemRecord = serde_json::from_value(raw).unwrap();
        assert!(record.status.details.is_none());
        assert!(record.design.is_none());
        assert!(record.core.is_none());
    }
}
