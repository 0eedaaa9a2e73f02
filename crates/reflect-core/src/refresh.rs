// ── Background refresh engine ──
//
// One task owns the polling schedule: a 500 ms liveness tick, a
// cool-down-gated top-level fetch of the system and core lists, and a
// bounded fan-out that pulls each surviving system's inventory. Every
// failure inside a tick is caught, formatted with its cause, and
// deduplicated into the per-category error sets -- the loop itself never
// dies; consumers learn about failures on their next facade call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use reflect_api::{DeviceMapping, ReflectClient};

use crate::error::CoreError;
use crate::filter::{self, FilterCriteria};
use crate::gates::TimeGates;
use crate::model::device::{CORE_DEVICE_TYPE, property};
use crate::model::{Device, SystemInfo};
use crate::store::Store;

/// Liveness tick: how often the loop re-evaluates the activity gate.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Granularity of the inter-cycle cool-down wait.
const COOLDOWN_POLL: Duration = Duration::from_secs(1);

/// Concurrent per-system detail fetches. Bounded so a large system count
/// cannot turn into one request per system all at once, while still
/// overlapping network latency.
const FAN_OUT_CONCURRENCY: usize = 8;

/// Observable state of the refresh engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No consumer has asked for device data recently; no polling.
    Paused,
    /// Between ticks, ready to fetch when the cool-down allows.
    Idle,
    /// Fetching the system and core lists.
    Fetching,
    /// Per-system detail fetches in flight.
    FanningOut,
    /// Waiting out the inter-cycle cool-down.
    CoolingDown,
    /// Shut down; no further background writes.
    Stopped,
}

/// Everything one loop run needs, shared with its fan-out tasks.
pub(crate) struct RefreshContext {
    pub(crate) client: ReflectClient,
    pub(crate) core_mapping: DeviceMapping,
    pub(crate) item_mapping: DeviceMapping,
    pub(crate) store: Arc<Store>,
    pub(crate) gates: Arc<TimeGates>,
    pub(crate) criteria: FilterCriteria,
    pub(crate) metadata_timeout: Duration,
    pub(crate) cancel: CancellationToken,
    pub(crate) state: Arc<watch::Sender<RefreshState>>,
}

impl RefreshContext {
    fn set_state(&self, state: RefreshState) {
        self.state.send_replace(state);
    }
}

/// Run the refresh loop until cancelled.
pub(crate) async fn run(ctx: Arc<RefreshContext>) {
    debug!("refresh loop started");

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            () = sleep(TICK_INTERVAL) => {}
        }

        if ctx.gates.is_paused() {
            ctx.set_state(RefreshState::Paused);
            continue;
        }
        ctx.set_state(RefreshState::Idle);

        // Inside the cool-down window the tick is a no-op: stale cached
        // data keeps being served.
        if !ctx.gates.metadata_refresh_due() {
            continue;
        }

        run_cycle(&ctx).await;

        if ctx.cancel.is_cancelled() {
            break;
        }
    }

    ctx.set_state(RefreshState::Stopped);
    debug!("refresh loop stopped");
}

/// One full collection cycle: top-level fetch, fan-out, filter, cool-down.
async fn run_cycle(ctx: &Arc<RefreshContext>) {
    ctx.set_state(RefreshState::Fetching);
    fetch_systems(ctx).await;
    fetch_cores(ctx).await;

    // Armed at submission time: an overlapping slow fetch can never
    // trigger a second overlapping fan-out.
    ctx.gates.arm_metadata_cooldown(ctx.metadata_timeout);

    let systems = ctx.store.systems_snapshot();
    let work_list = filter::by_system_name(systems, ctx.criteria.system_names.as_ref());

    if ctx.criteria.system_names.is_some() && work_list.is_empty() {
        // No device can belong to a system that is filtered away.
        debug!("system name filter matched no systems; clearing device cache");
        ctx.store.clear_devices();
    } else {
        ctx.set_state(RefreshState::FanningOut);
        fan_out_details(ctx, work_list).await;
    }

    if ctx.cancel.is_cancelled() {
        return;
    }

    // Only after all fan-out tasks have drained -- never on a partially
    // populated device list.
    if !ctx.store.devices_is_empty() {
        ctx.store.retain_devices(&ctx.criteria);
    }
    ctx.store.mark_refreshed();
    debug!(devices = ctx.store.device_count(), "collection cycle finished");

    ctx.set_state(RefreshState::CoolingDown);
    ctx.gates.arm_device_cycle_cooldown();
    while ctx.gates.device_cycle_pending() {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => return,
            () = sleep(COOLDOWN_POLL) => {}
        }
    }
}

/// Fetch `/systems` and replace the system list. On failure the previous
/// list is retained and the error recorded.
async fn fetch_systems(ctx: &RefreshContext) {
    debug!("fetching system information list");
    match ctx.client.list_systems().await {
        Ok(records) => {
            let systems: Vec<SystemInfo> = records.into_iter().map(SystemInfo::from).collect();
            debug!(count = systems.len(), "fetched system information list");
            ctx.store.replace_systems(systems);
        }
        Err(e) => {
            let message = format!("System information retrieval failed: {}", CoreError::from(e));
            warn!("{message}");
            ctx.store.system_errors.push(message);
        }
    }
}

/// Fetch `/cores`, replace the device list with the top-level devices
/// (annotated as `Core`), and repopulate the status side table. On
/// failure the previous contents are retained and the error recorded.
async fn fetch_cores(ctx: &RefreshContext) {
    debug!("fetching core device list");
    let records = match ctx.client.list_cores().await {
        Ok(records) => records,
        Err(e) => {
            let message = format!("Device list retrieval failed: {}", CoreError::from(e));
            warn!("{message}");
            ctx.store.device_errors.push(message);
            return;
        }
    };

    ctx.store
        .merge_status_messages(status_entries(ctx, &records));

    match ctx.core_mapping.extract_devices(&records) {
        Ok(mapped) => {
            let devices: Vec<Device> = mapped
                .into_iter()
                .map(|m| {
                    let mut device = Device::from(m);
                    // /cores records carry no type field of their own.
                    device.properties.insert(
                        property::DEVICE_TYPE.to_owned(),
                        CORE_DEVICE_TYPE.to_owned(),
                    );
                    device
                })
                .collect();
            debug!(count = devices.len(), "fetched core device list");
            ctx.store.replace_devices(devices);
        }
        Err(e) => {
            let message = format!("Device list mapping failed: {}", CoreError::from(e));
            warn!("{message}");
            ctx.store.device_errors.push(message);
        }
    }
}

/// Fetch every work-list system's inventory through the bounded worker
/// pool, appending to the device cache as each task completes. Task
/// completion order is unspecified; a failing task never aborts its
/// siblings.
async fn fan_out_details(ctx: &Arc<RefreshContext>, work_list: Vec<SystemInfo>) {
    if work_list.is_empty() {
        return;
    }
    debug!(systems = work_list.len(), "fanning out detail fetches");

    let semaphore = Arc::new(Semaphore::new(FAN_OUT_CONCURRENCY));
    let mut tasks: JoinSet<()> = JoinSet::new();

    for system in work_list {
        let ctx = Arc::clone(ctx);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            fetch_system_items(&ctx, system.id, &system.name).await;
        });
    }

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                // Shutdown: abandon outstanding detail fetches, then wait
                // for them to wind down so no store write can land after
                // shared state starts clearing.
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                return;
            }
            joined = tasks.join_next() => {
                match joined {
                    None => return,
                    Some(Ok(())) => {}
                    Some(Err(e)) if e.is_cancelled() => {}
                    Some(Err(e)) => warn!(error = %e, "detail fetch task panicked"),
                }
            }
        }
    }
}

/// One detail task: fetch `/systems/{id}/items`, map with the item
/// table, append to the shared cache and side table.
async fn fetch_system_items(ctx: &RefreshContext, system_id: i64, system_name: &str) {
    debug!(system_id, system_name, "fetching system inventory");
    let records = match ctx.client.list_system_items(system_id).await {
        Ok(records) => records,
        Err(e) => {
            let message = format!(
                "Device detail retrieval failed for system {system_name}: {}",
                CoreError::from(e)
            );
            warn!("{message}");
            ctx.store.device_errors.push(message);
            return;
        }
    };

    ctx.store
        .merge_status_messages(status_entries(ctx, &records));

    match ctx.item_mapping.extract_devices(&records) {
        Ok(mapped) => {
            let devices: Vec<Device> = mapped.into_iter().map(Device::from).collect();
            ctx.store.append_devices(devices);
        }
        Err(e) => {
            let message = format!(
                "Device detail mapping failed for system {system_name}: {}",
                CoreError::from(e)
            );
            warn!("{message}");
            ctx.store.device_errors.push(message);
        }
    }
}

/// Pull `(id, status.message)` pairs out of raw device records for the
/// side table. A record with an id but no status message is an upstream
/// inconsistency: recorded, but it does not fail the batch.
fn status_entries(ctx: &RefreshContext, records: &[Value]) -> Vec<(String, String)> {
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let Some(id) = pointer_string(record, "/id") else {
            continue; // mapping extraction reports id-less records
        };
        match pointer_string(record, "/status/message") {
            Some(message) => entries.push((id, message)),
            None => {
                let error = CoreError::UpstreamInconsistency {
                    message: format!("device {id} has no status message"),
                };
                ctx.store.device_errors.push(error.to_string());
            }
        }
    }
    entries
}

/// Resolve a JSON pointer to a display string (strings and numbers only).
fn pointer_string(record: &Value, pointer: &str) -> Option<String> {
    match record.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
