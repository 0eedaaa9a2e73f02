// Declarative field mapping for vendor device payloads.
//
// The `/cores` and `/systems/{id}/items` records are not decoded with
// serde; a YAML mapping table of JSON pointers decides which wire fields
// become device identity fields and which become named properties. The
// two tables ship embedded in the crate, mirroring the vendor payload
// shapes they were written against.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Embedded mapping table for `/cores` records.
const CORE_MAPPING_YML: &str = include_str!("../mappings/core-mapping.yml");

/// Embedded mapping table for `/systems/{id}/items` records. Richer than
/// the core table: items carry a device type and per-site placement.
const ITEM_MAPPING_YML: &str = include_str!("../mappings/item-mapping.yml");

/// A device record extracted from a raw payload by a mapping table.
///
/// `properties` preserves the mapping table's declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedDevice {
    pub id: String,
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub status_message: Option<String>,
    pub properties: IndexMap<String, String>,
}

/// Identity-field pointers of a mapping table.
#[derive(Debug, Clone, Deserialize)]
struct DeviceFieldPaths {
    id: String,
    name: String,
    model: String,
    #[serde(rename = "serialNumber")]
    serial_number: String,
    #[serde(rename = "statusMessage", default)]
    status_message: Option<String>,
}

/// A loaded mapping table: identity pointers plus an ordered
/// `property name -> JSON pointer` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceMapping {
    device: DeviceFieldPaths,
    #[serde(default)]
    properties: IndexMap<String, String>,
}

impl DeviceMapping {
    /// Parse a mapping table from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Mapping {
            message: format!("failed to load mapping table: {e}"),
        })
    }

    /// The embedded table for `/cores` records.
    pub fn core_mapping() -> Result<Self, Error> {
        Self::from_yaml(CORE_MAPPING_YML)
    }

    /// The embedded table for `/systems/{id}/items` records.
    pub fn item_mapping() -> Result<Self, Error> {
        Self::from_yaml(ITEM_MAPPING_YML)
    }

    /// Extract devices from a raw record array.
    ///
    /// Pure: the same input always yields the same output. A record whose
    /// `id` pointer does not resolve fails the whole batch -- an id-less
    /// device cannot be cached or enriched. Every other unresolvable
    /// pointer just skips its field.
    pub fn extract_devices(&self, records: &[Value]) -> Result<Vec<MappedDevice>, Error> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.extract_one(index, record))
            .collect()
    }

    fn extract_one(&self, index: usize, record: &Value) -> Result<MappedDevice, Error> {
        let id = lookup(record, &self.device.id).ok_or_else(|| Error::Mapping {
            message: format!(
                "record {index} has no resolvable id at pointer {}",
                self.device.id
            ),
        })?;

        let mut properties = IndexMap::new();
        for (name, pointer) in &self.properties {
            if let Some(value) = lookup(record, pointer) {
                properties.insert(name.clone(), value);
            }
        }

        Ok(MappedDevice {
            id,
            name: lookup(record, &self.device.name).unwrap_or_default(),
            model: lookup(record, &self.device.model).unwrap_or_default(),
            serial_number: lookup(record, &self.device.serial_number).unwrap_or_default(),
            status_message: self
                .device
                .status_message
                .as_deref()
                .and_then(|pointer| lookup(record, pointer)),
            properties,
        })
    }
}

/// Resolve a JSON pointer and render the leaf as a string.
///
/// Strings come through verbatim; numbers and booleans via their display
/// form. Nulls, arrays, and objects do not map to a property value.
fn lookup(record: &Value, pointer: &str) -> Option<String> {
    match record.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
