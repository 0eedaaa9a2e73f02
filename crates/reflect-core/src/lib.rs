//! Background aggregation engine and consumer facade for the Q-SYS
//! Reflect Enterprise Management API.
//!
//! This crate owns the business logic between `reflect-api` and a
//! pull-based monitoring consumer:
//!
//! - **[`ReflectAggregator`]** — Central facade with an explicit
//!   [`start()`](ReflectAggregator::start) / [`stop()`](ReflectAggregator::stop)
//!   lifecycle. Consumers call [`get_summary()`](ReflectAggregator::get_summary)
//!   for per-system statistics and [`get_devices()`](ReflectAggregator::get_devices)
//!   for the filtered device snapshot; both answer from the local cache and
//!   never touch the network.
//!
//! - **Refresh engine** ([`refresh`]) — A background task polling the
//!   Reflect cloud on a two-tier, staleness-gated schedule: the system and
//!   core lists on a metadata cool-down, per-system inventory through a
//!   bounded fan-out. Pauses itself whenever no consumer has asked for
//!   device data recently.
//!
//! - **[`Store`]** — Mutex-guarded authoritative state. Snapshots are deep
//!   copies: consumers can never corrupt the cache, and uptime
//!   normalization never mutates cached raw values.
//!
//! - **[`FilterCriteria`]** — Typed, parse-once filter configuration over
//!   device model, status message, device type, and system name.

pub mod aggregator;
pub mod config;
pub mod convert;
pub mod error;
pub mod error_set;
pub mod filter;
pub mod gates;
pub mod model;
pub mod refresh;
pub mod stats;
pub mod store;
pub mod uptime;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::ReflectAggregator;
pub use config::AggregatorConfig;
pub use error::CoreError;
pub use filter::{FilterCriteria, ValueFilter};
pub use model::{AlertCounts, Device, SystemInfo};
pub use refresh::RefreshState;
pub use store::Store;
