//! Remote change ingress.
//!
//! Applies batches of incoming change events to the local store under
//! last-write-wins semantics:
//! 1. drop echoes of this device's own publishes;
//! 2. keep only the newest surviving event;
//! 3. reject it if it is not newer than everything already applied;
//! 4. otherwise persist it, signal a UI refresh, and run the transition
//!    side effects.
//!
//! Timestamps are device-local clocks. No clock synchronization is assumed
//! beyond each device's own clock being monotonic: a device only ever
//! compares timestamps it would itself also accept as newer.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::session::{Transition, TransitionEngine};
use crate::storage::SessionStore;

use super::types::ChangeEvent;

type RefreshHook = Box<dyn Fn() + Send + Sync>;

/// Listener pipeline for remote change batches.
///
/// One instance per device; its caller delivers batches serially.
pub struct SyncIngress {
    store: Arc<SessionStore>,
    engine: Arc<TransitionEngine>,
    /// This device's id for echo suppression. `None` means the id could not
    /// be resolved: every event is then treated as remote (fail open), since
    /// dropping legitimate updates is worse than reprocessing an echo.
    local_device_id: Option<String>,
    /// Timestamp of the newest event applied through this ingress.
    high_water_mark: Mutex<i64>,
    on_synced: RefreshHook,
}

impl SyncIngress {
    /// Build an ingress over `store`. The high-water mark starts at the
    /// persisted snapshot's timestamp, so events already reflected in the
    /// store are stale on arrival.
    pub fn new(
        store: Arc<SessionStore>,
        engine: Arc<TransitionEngine>,
        local_device_id: Option<String>,
    ) -> Self {
        let initial_mark = store.read().update_timestamp;
        Self {
            store,
            engine,
            local_device_id,
            high_water_mark: Mutex::new(initial_mark),
            on_synced: Box::new(|| {}),
        }
    }

    /// Replace the "state synced" UI-refresh hook.
    pub fn with_refresh_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_synced = Box::new(hook);
        self
    }

    /// Apply one batch of change events.
    ///
    /// Returns the transition that fired, or `None` when the whole batch was
    /// discarded (all echoes, or nothing newer than the high-water mark).
    pub fn apply_batch(&self, events: &[ChangeEvent]) -> Option<Transition> {
        let winner = self.select_winner(events)?;

        let mut mark = self.high_water_mark.lock().unwrap();
        let previous = self.store.read();
        // Local writes bump the persisted timestamp without going through
        // this ingress, so the effective mark is the newer of the two.
        let effective_mark = (*mark).max(previous.update_timestamp);
        if winner.snapshot.update_timestamp <= effective_mark {
            debug!(
                event_ts = winner.snapshot.update_timestamp,
                mark = effective_mark,
                "stale remote event rejected"
            );
            return None;
        }

        if let Err(e) = self.store.write(&winner.snapshot) {
            warn!(error = %e, "failed to persist remote snapshot, keeping previous state");
            return None;
        }
        *mark = winner.snapshot.update_timestamp;
        drop(mark);

        info!(
            origin = %winner.origin_device_id,
            ts = winner.snapshot.update_timestamp,
            fasting = winner.snapshot.is_fasting,
            "remote snapshot applied"
        );
        (self.on_synced)();
        Some(self.engine.process(Some(&previous), &winner.snapshot))
    }

    /// Echo suppression plus winner selection (steps 1-3).
    fn select_winner<'a>(&self, events: &'a [ChangeEvent]) -> Option<&'a ChangeEvent> {
        events
            .iter()
            .filter(|event| match &self.local_device_id {
                Some(local) => &event.origin_device_id != local,
                None => true,
            })
            .max_by_key(|event| event.snapshot.update_timestamp)
    }
}
