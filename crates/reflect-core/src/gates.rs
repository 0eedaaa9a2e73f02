// ── Time gates ──
//
// Three mutable deadlines decide when each class of background work may
// run again. Encapsulated in one instance (no static state) so that a
// torn-down aggregator can be rebuilt with the fail-safe defaults.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Consumer inactivity timeout: with no device call for this long, the
/// refresh engine pauses and the cloud API is left alone.
pub(crate) const ACTIVITY_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// Inter-cycle cool-down between two device collection cycles.
pub(crate) const DEVICE_CYCLE_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct GateState {
    /// Consumer liveness deadline. `None` until the first device call:
    /// the engine starts paused and never polls without a live consumer.
    activity_deadline: Option<Instant>,
    /// Until this instant, the top-level metadata fetch (and the fan-out
    /// it feeds) is skipped and stale cached data is served.
    metadata_cooldown_until: Option<Instant>,
    /// Until this instant, the loop waits before starting another cycle.
    next_device_cycle_at: Option<Instant>,
}

/// Mutable timestamps gating the refresh engine's work classes.
#[derive(Debug, Default)]
pub struct TimeGates {
    state: Mutex<GateState>,
}

impl TimeGates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a consumer liveness signal: polling stays enabled for the
    /// next [`ACTIVITY_TIMEOUT`].
    pub fn note_activity(&self) {
        let mut state = self.lock();
        state.activity_deadline = Some(Instant::now() + ACTIVITY_TIMEOUT);
    }

    /// `true` when no consumer has signalled liveness recently. The
    /// default state before any consumer call is paused.
    pub fn is_paused(&self) -> bool {
        let state = self.lock();
        match state.activity_deadline {
            None => true,
            Some(deadline) => Instant::now() > deadline,
        }
    }

    /// `true` when the metadata cool-down window has passed (or was
    /// never armed).
    pub fn metadata_refresh_due(&self) -> bool {
        let state = self.lock();
        match state.metadata_cooldown_until {
            None => true,
            Some(until) => Instant::now() >= until,
        }
    }

    /// Arm the metadata cool-down window. Called at fan-out submission
    /// time, so overlapping slow fetches cannot trigger a second
    /// overlapping fan-out.
    pub fn arm_metadata_cooldown(&self, window: Duration) {
        let mut state = self.lock();
        state.metadata_cooldown_until = Some(Instant::now() + window);
    }

    /// Arm the inter-cycle cool-down.
    pub fn arm_device_cycle_cooldown(&self) {
        let mut state = self.lock();
        state.next_device_cycle_at = Some(Instant::now() + DEVICE_CYCLE_COOLDOWN);
    }

    /// Re-activate collection promptly: the facade's device call resets
    /// the inter-cycle deadline to "now".
    pub fn release_device_cycle_cooldown(&self) {
        let mut state = self.lock();
        state.next_device_cycle_at = Some(Instant::now());
    }

    /// `true` while the inter-cycle deadline is still in the future.
    pub fn device_cycle_pending(&self) -> bool {
        let state = self.lock();
        state
            .next_device_cycle_at
            .is_some_and(|at| Instant::now() < at)
    }

    /// Drop every deadline back to the fail-safe defaults (paused).
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = GateState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
