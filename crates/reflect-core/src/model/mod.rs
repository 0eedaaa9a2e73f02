// ── Domain model ──

pub mod device;
pub mod system;

pub use device::Device;
pub use system::{AlertCounts, SystemInfo};

/// Status message the Reflect cloud reports for a healthy, running
/// device or system. Drives the derived `online` flag.
pub const STATUS_RUNNING: &str = "Running";

/// Placeholder emitted wherever an uptime cannot be computed.
pub const NONE_VALUE: &str = "None";
