// ── Authoritative cache ──
//
// Holds the last-known system list, device list, and the device-id ->
// status-message side table. Two execution contexts touch it: the
// refresh engine (writes) and arbitrary facade callers (reads). Every
// collection sits behind its own lock; locks are never held across an
// await point. Consumers only ever see deep-copied snapshots.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::error_set::ErrorSet;
use crate::filter::FilterCriteria;
use crate::model::device::property;
use crate::model::{Device, NONE_VALUE, STATUS_RUNNING, SystemInfo};
use crate::uptime::{normalize_elapsed, parse_seconds};

/// Central cache for aggregated Reflect state.
pub struct Store {
    systems: RwLock<Vec<SystemInfo>>,
    devices: RwLock<Vec<Device>>,
    status_messages: RwLock<HashMap<String, String>>,
    /// Background failures while fetching device data.
    pub(crate) device_errors: ErrorSet,
    /// Background failures while fetching system information.
    pub(crate) system_errors: ErrorSet,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Store {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            systems: RwLock::new(Vec::new()),
            devices: RwLock::new(Vec::new()),
            status_messages: RwLock::new(HashMap::new()),
            device_errors: ErrorSet::new(),
            system_errors: ErrorSet::new(),
            last_refresh,
        }
    }

    // ── System list ──────────────────────────────────────────────────

    /// Replace the system list wholesale. Systems are never merged.
    pub fn replace_systems(&self, systems: Vec<SystemInfo>) {
        let mut guard = self.write_systems();
        *guard = systems;
    }

    /// Clone of the current system list.
    pub fn systems_snapshot(&self) -> Vec<SystemInfo> {
        self.read_systems().clone()
    }

    // ── Device list ──────────────────────────────────────────────────

    /// Replace the device list wholesale (start of a refresh cycle).
    pub fn replace_devices(&self, devices: Vec<Device>) {
        let mut guard = self.write_devices();
        *guard = devices;
    }

    /// Append devices from one per-system detail fetch.
    ///
    /// Ids already present are skipped: a device id is unique within one
    /// cache snapshot.
    pub fn append_devices(&self, devices: Vec<Device>) {
        let mut guard = self.write_devices();
        for device in devices {
            if guard.iter().any(|existing| existing.id == device.id) {
                debug!(id = %device.id, "skipping duplicate device id");
            } else {
                guard.push(device);
            }
        }
    }

    /// Drop devices the criteria reject (post-fan-out in-place pass).
    pub fn retain_devices(&self, criteria: &FilterCriteria) {
        let mut guard = self.write_devices();
        guard.retain(|device| criteria.accepts_device(device));
    }

    pub fn devices_is_empty(&self) -> bool {
        self.read_devices().is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.read_devices().len()
    }

    /// Clear the device list (e.g. when the system-name filter leaves no
    /// system to fetch from).
    pub fn clear_devices(&self) {
        let mut guard = self.write_devices();
        guard.clear();
    }

    // ── Status side table ────────────────────────────────────────────

    /// Merge fresh status messages keyed by device id. The side table is
    /// authoritative at snapshot time.
    pub fn merge_status_messages<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut guard = self.write_status();
        guard.extend(entries);
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Deep-copied, consumer-ready device snapshot.
    ///
    /// Each clone gets its uptime property normalized to the
    /// human-readable form and its status message overwritten from the
    /// side table; the cached originals are never mutated, so
    /// normalization cannot be applied twice.
    pub fn device_snapshot(&self) -> Vec<Device> {
        self.device_snapshot_at(Utc::now().timestamp())
    }

    pub(crate) fn device_snapshot_at(&self, now_epoch_secs: i64) -> Vec<Device> {
        let status_messages = self.read_status().clone();
        let devices = self.read_devices();

        devices
            .iter()
            .map(|device| {
                let mut clone = device.clone();
                enrich_snapshot(&mut clone, &status_messages, now_epoch_secs);
                clone
            })
            .collect()
    }

    // ── Refresh metadata ─────────────────────────────────────────────

    /// Stamp a completed refresh cycle.
    pub fn mark_refreshed(&self) {
        let _ = self.last_refresh.send(Some(Utc::now()));
    }

    /// When the last refresh cycle completed, if ever.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Subscribe to refresh-cycle completion stamps.
    pub fn subscribe_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Clear every cached collection and both error sets (shutdown).
    pub fn clear_all(&self) {
        self.write_systems().clear();
        self.write_devices().clear();
        self.write_status().clear();
        self.device_errors.clear();
        self.system_errors.clear();
        let _ = self.last_refresh.send(None);
    }

    // ── Lock plumbing ────────────────────────────────────────────────

    fn read_systems(&self) -> std::sync::RwLockReadGuard<'_, Vec<SystemInfo>> {
        self.systems.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_systems(&self) -> std::sync::RwLockWriteGuard<'_, Vec<SystemInfo>> {
        self.systems.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_devices(&self) -> std::sync::RwLockReadGuard<'_, Vec<Device>> {
        self.devices.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_devices(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Device>> {
        self.devices.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_status(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, String>> {
        self.status_messages
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn write_status(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        self.status_messages
            .write()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize one snapshot clone: format its uptime, overwrite its status
/// message from the side table, re-derive `online` from the final
/// message.
fn enrich_snapshot(
    device: &mut Device,
    status_messages: &HashMap<String, String>,
    now_epoch_secs: i64,
) {
    // The wire carries either a started-at timestamp (epoch seconds) or
    // a raw seconds duration; whichever is present wins.
    let elapsed = if let Some(raw) = device.properties.get(property::UPTIME_STARTED_AT) {
        parse_seconds(raw).map(|started_at| now_epoch_secs - started_at)
    } else {
        device
            .properties
            .get(property::UPTIME)
            .and_then(|raw| parse_seconds(raw))
    };

    let formatted = elapsed.map_or_else(|| NONE_VALUE.to_owned(), normalize_elapsed);
    device.properties.shift_remove(property::UPTIME_STARTED_AT);
    device
        .properties
        .insert(property::UPTIME.to_owned(), formatted);

    if let Some(message) = status_messages.get(&device.id) {
        device
            .properties
            .insert(property::STATUS_MESSAGE.to_owned(), message.clone());
    }
    device.online = device.status_message() == Some(STATUS_RUNNING);
}
