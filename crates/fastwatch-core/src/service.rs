//! The local mutation path.
//!
//! Every local write flows through [`MutationService`]: precondition check,
//! store write, best-effort publish, then transition side effects -- invoked
//! directly rather than through the sync ingress, since this device is the
//! origin and must not wait for its own echo.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::{CoreError, StateError};
use crate::session::{now_ms, SessionSnapshot, Transition, TransitionEngine};
use crate::storage::SessionStore;
use crate::sync::{RemoteChannel, SyncCommand};

/// What became of a received one-shot command.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command mutated session state.
    Applied(Transition),
    /// The command is a platform-UI concern; the embedder handles it.
    Deferred(SyncCommand),
}

/// Validates, persists, publishes, and processes local session mutations.
///
/// Operations are single-flight per device: the whole check-write-publish
/// sequence runs under one guard, so two near-simultaneous local calls
/// cannot both pass the same precondition.
pub struct MutationService {
    store: Arc<SessionStore>,
    channel: Arc<dyn RemoteChannel>,
    engine: Arc<TransitionEngine>,
    gate: Mutex<()>,
}

impl MutationService {
    pub fn new(
        store: Arc<SessionStore>,
        channel: Arc<dyn RemoteChannel>,
        engine: Arc<TransitionEngine>,
    ) -> Self {
        Self {
            store,
            channel,
            engine,
            gate: Mutex::new(()),
        }
    }

    /// Begin a session now with the given goal.
    ///
    /// # Errors
    /// `StateError::AlreadyFasting` if a session is active.
    pub fn start_fasting(&self, goal_id: &str) -> Result<Transition, CoreError> {
        let start = now_ms();
        self.start_fasting_at(goal_id, start)
    }

    /// Begin a session with an explicit start time (remote command path,
    /// retroactive starts).
    pub fn start_fasting_at(&self, goal_id: &str, start_time_ms: i64) -> Result<Transition, CoreError> {
        let _flight = self.gate.lock().unwrap();
        let previous = self.store.read();
        if previous.is_fasting {
            return Err(StateError::AlreadyFasting.into());
        }
        let next = SessionSnapshot {
            is_fasting: true,
            start_time: start_time_ms,
            goal_id: goal_id.to_string(),
            update_timestamp: next_timestamp(&previous),
        };
        self.commit(&previous, next)
    }

    /// End the active session.
    ///
    /// # Errors
    /// `StateError::NotFasting` if no session is active.
    pub fn stop_fasting(&self) -> Result<Transition, CoreError> {
        let _flight = self.gate.lock().unwrap();
        let previous = self.store.read();
        if !previous.is_fasting {
            return Err(StateError::NotFasting.into());
        }
        let next = SessionSnapshot {
            is_fasting: false,
            start_time: 0,
            goal_id: previous.goal_id.clone(),
            update_timestamp: next_timestamp(&previous),
        };
        self.commit(&previous, next)
    }

    /// Merge a new start time and/or goal onto the current snapshot.
    ///
    /// # Errors
    /// `StateError::NoOpUpdate` when both fields are absent.
    pub fn update_config(
        &self,
        start_time_ms: Option<i64>,
        goal_id: Option<&str>,
    ) -> Result<Transition, CoreError> {
        if start_time_ms.is_none() && goal_id.is_none() {
            return Err(StateError::NoOpUpdate.into());
        }
        let _flight = self.gate.lock().unwrap();
        let previous = self.store.read();
        let next = SessionSnapshot {
            is_fasting: previous.is_fasting,
            start_time: start_time_ms.unwrap_or(previous.start_time),
            goal_id: goal_id.map(String::from).unwrap_or_else(|| previous.goal_id.clone()),
            update_timestamp: next_timestamp(&previous),
        };
        self.commit(&previous, next)
    }

    /// Re-publish the current snapshot with a bumped timestamp.
    ///
    /// Manual recovery for a suspected missed publish: the peer will accept
    /// it as newer and converge.
    pub fn sync_current_state(&self) -> Result<Transition, CoreError> {
        let _flight = self.gate.lock().unwrap();
        let previous = self.store.read();
        let mut next = previous.clone();
        next.update_timestamp = next_timestamp(&previous);
        self.commit(&previous, next)
    }

    /// Route a decoded one-shot command from the peer device.
    pub fn handle_command(&self, command: SyncCommand) -> Result<CommandOutcome, CoreError> {
        match command {
            SyncCommand::StartFasting { start_time_ms } => {
                let goal_id = self.store.read().goal_id;
                self.start_fasting_at(&goal_id, start_time_ms)
                    .map(CommandOutcome::Applied)
            }
            SyncCommand::StopFasting => self.stop_fasting().map(CommandOutcome::Applied),
            deferred @ (SyncCommand::UpdateStartTime | SyncCommand::OpenWatchApp { .. }) => {
                Ok(CommandOutcome::Deferred(deferred))
            }
        }
    }

    /// Write, publish (best effort), process. Callers hold the flight guard.
    fn commit(
        &self,
        previous: &SessionSnapshot,
        next: SessionSnapshot,
    ) -> Result<Transition, CoreError> {
        self.store.write(&next)?;
        if let Err(e) = self.channel.publish(&next) {
            warn!(error = %e, "snapshot publish failed; next manual sync will correct the peer");
        }
        Ok(self.engine.process(Some(previous), &next))
    }
}

/// Strictly-increasing write timestamp for this device.
fn next_timestamp(previous: &SessionSnapshot) -> i64 {
    now_ms().max(previous.update_timestamp + 1)
}
