// ── API-to-domain type conversions ──
//
// Bridges raw `reflect_api` types into canonical `reflect_core::model`
// domain types.

use reflect_api::types::SystemRecord;
use reflect_api::MappedDevice;

use crate::model::{AlertCounts, Device, STATUS_RUNNING, SystemInfo};

impl From<SystemRecord> for SystemInfo {
    fn from(record: SystemRecord) -> Self {
        let alerts = record
            .status
            .details
            .and_then(|details| details.items)
            .map(|items| AlertCounts {
                normal: items.normal,
                warning: items.warning,
                fault: items.fault,
                unknown: items.unknown,
            });

        let (design_name, design_platform, uptime_epoch_millis) = match record.design {
            Some(design) => (design.name, design.platform, design.uptime),
            None => (None, None, None),
        };

        Self {
            id: record.id,
            code: record.code,
            name: record.name,
            status_message: record.status.message,
            alerts,
            design_name,
            design_platform,
            uptime_epoch_millis,
            core_name: record.core.and_then(|core| core.name),
        }
    }
}

impl From<MappedDevice> for Device {
    fn from(mapped: MappedDevice) -> Self {
        let online = mapped.status_message.as_deref() == Some(STATUS_RUNNING);
        Self {
            id: mapped.id,
            model: mapped.model,
            name: mapped.name,
            serial_number: mapped.serial_number,
            online,
            properties: mapped.properties,
        }
    }
}
