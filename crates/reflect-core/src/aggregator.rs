// ── Consumer facade ──
//
// The two consumer-facing operations answer from the local cache only;
// all network I/O happens on the refresh engine's tasks. The facade
// signals consumer liveness to the activity gate and lazily restarts a
// torn-down engine.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use reflect_api::{DeviceMapping, ReflectClient, TransportConfig};

use crate::config::AggregatorConfig;
use crate::error::CoreError;
use crate::filter::FilterCriteria;
use crate::gates::TimeGates;
use crate::model::Device;
use crate::refresh::{self, RefreshContext, RefreshState};
use crate::stats;
use crate::store::Store;

/// Handle to one spawned refresh loop.
struct LoopHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct Inner {
    config: AggregatorConfig,
    criteria: FilterCriteria,
    store: Arc<Store>,
    gates: Arc<TimeGates>,
    state: Arc<watch::Sender<RefreshState>>,
    refresh_loop: Mutex<Option<LoopHandle>>,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Owns the cache, the time gates, and the
/// refresh loop's lifecycle; no process-wide state survives
/// [`stop()`](Self::stop). Freshly constructed, the engine is paused and
/// performs zero network calls until the first
/// [`get_devices()`](Self::get_devices).
#[derive(Clone)]
pub struct ReflectAggregator {
    inner: Arc<Inner>,
}

impl ReflectAggregator {
    /// Create an aggregator from configuration. Does NOT spawn anything --
    /// call [`start()`](Self::start) or let the first
    /// [`get_devices()`](Self::get_devices) do it lazily.
    ///
    /// Filter strings are parsed into typed criteria here, once; apply
    /// time never re-splits configuration input.
    pub fn new(config: AggregatorConfig) -> Self {
        let criteria = FilterCriteria::parse(
            &config.filter_model,
            &config.filter_device_status_message,
            &config.filter_type,
            &config.filter_system_name,
        );
        let (state, _) = watch::channel(RefreshState::Paused);

        Self {
            inner: Arc::new(Inner {
                config,
                criteria,
                store: Arc::new(Store::new()),
                gates: Arc::new(TimeGates::new()),
                state: Arc::new(state),
                refresh_loop: Mutex::new(None),
            }),
        }
    }

    /// Access the aggregator configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.inner.config
    }

    /// The parsed filter criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.inner.criteria
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    /// Current refresh-engine state.
    pub fn refresh_state(&self) -> RefreshState {
        *self.inner.state.borrow()
    }

    /// Subscribe to refresh-engine state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<RefreshState> {
        self.inner.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the refresh loop if it is not already running.
    ///
    /// Must be called from within a Tokio runtime. The freshly started
    /// engine stays paused until a consumer signals liveness through
    /// [`get_devices()`](Self::get_devices).
    pub fn start(&self) -> Result<(), CoreError> {
        let mut slot = self.lock_loop();
        if let Some(running) = slot.as_ref() {
            if !running.task.is_finished() {
                return Ok(());
            }
        }

        let transport = TransportConfig {
            timeout: self.inner.config.request_timeout,
        };
        let client = ReflectClient::new(
            self.inner.config.base_url.clone(),
            &self.inner.config.api_token,
            &transport,
        )?;
        let core_mapping = DeviceMapping::core_mapping()?;
        let item_mapping = DeviceMapping::item_mapping()?;

        let cancel = CancellationToken::new();
        let ctx = Arc::new(RefreshContext {
            client,
            core_mapping,
            item_mapping,
            store: Arc::clone(&self.inner.store),
            gates: Arc::clone(&self.inner.gates),
            criteria: self.inner.criteria.clone(),
            metadata_timeout: self.inner.config.metadata_timeout(),
            cancel: cancel.clone(),
            state: Arc::clone(&self.inner.state),
        });

        self.inner.state.send_replace(RefreshState::Paused);
        let task = tokio::spawn(refresh::run(ctx));
        *slot = Some(LoopHandle { cancel, task });
        info!("refresh engine started");
        Ok(())
    }

    /// Shut the refresh engine down: signal the loop, cancel outstanding
    /// fan-out work, join, then clear all cached state. No background
    /// write can land after clearing begins.
    pub async fn stop(&self) {
        let handle = self.lock_loop().take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            let _ = handle.task.await;
            info!("refresh engine stopped");
        }
        self.inner.store.clear_all();
        self.inner.gates.reset();
        self.inner.state.send_replace(RefreshState::Stopped);
    }

    // ── Consumer operations ──────────────────────────────────────────

    /// One flattened statistics record: `"{systemName}#{Metric}"` keys
    /// over all cached systems.
    ///
    /// Fails with [`CoreError::Configuration`] when the token is empty,
    /// or with [`CoreError::Unreachable`] carrying the pending
    /// system-info errors (which are cleared by this call).
    pub fn get_summary(&self) -> Result<HashMap<String, String>, CoreError> {
        self.ensure_token()?;

        let systems = self.inner.store.systems_snapshot();
        let devices = self.inner.store.device_snapshot();
        let summary = stats::build_system_stats(&systems, &devices, Utc::now().timestamp_millis());

        if let Some(message) = self.inner.store.system_errors.drain() {
            return Err(CoreError::Unreachable { message });
        }
        debug!(metrics = summary.len(), "summary served from cache");
        Ok(summary)
    }

    /// The current filtered device snapshot, optionally restricted to an
    /// id set.
    ///
    /// Signals consumer liveness, releases the inter-cycle cool-down,
    /// and lazily (re)starts a torn-down refresh loop. Fails with
    /// [`CoreError::Configuration`] when the token is empty, or with
    /// [`CoreError::Unreachable`] carrying the pending device errors
    /// (which are cleared by this call). Must be called from within a
    /// Tokio runtime.
    pub fn get_devices(
        &self,
        id_filter: Option<&HashSet<String>>,
    ) -> Result<Vec<Device>, CoreError> {
        self.ensure_token()?;
        self.start()?;

        self.inner.gates.note_activity();
        self.inner.gates.release_device_cycle_cooldown();

        if let Some(message) = self.inner.store.device_errors.drain() {
            return Err(CoreError::Unreachable { message });
        }

        let snapshot = self.inner.store.device_snapshot();
        let filtered = self.inner.criteria.apply_to_devices(snapshot);
        let devices = match id_filter {
            None => filtered,
            Some(ids) => filtered
                .into_iter()
                .filter(|device| ids.contains(&device.id))
                .collect(),
        };
        debug!(devices = devices.len(), "device snapshot served from cache");
        Ok(devices)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn ensure_token(&self) -> Result<(), CoreError> {
        if self
            .inner
            .config
            .api_token
            .expose_secret()
            .trim()
            .is_empty()
        {
            return Err(CoreError::configuration("API token is empty"));
        }
        Ok(())
    }

    fn lock_loop(&self) -> std::sync::MutexGuard<'_, Option<LoopHandle>> {
        self.inner
            .refresh_loop
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}
