//! State-transition detection and side-effect dispatch.
//!
//! [`classify`] is a pure diff of two snapshots; it has no retained state and
//! no side effects. [`TransitionEngine::process`] consumes the classification
//! exactly once per call: it drives notification (re)scheduling, appends the
//! history record on completion, and invokes the platform hooks.

use std::sync::Arc;

use tracing::warn;

use crate::goal;
use crate::notify::NotificationScheduler;
use crate::storage::SessionStore;

use super::{now_ms, HistoryRecord, SessionSnapshot};

/// Classification of a snapshot change. Exactly one per processed mutation,
/// whether it originated locally or arrived over sync.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Inactive (or absent) -> active.
    Started { current: SessionSnapshot },
    /// Active -> inactive: the session completed.
    Stopped {
        previous: SessionSnapshot,
        current: SessionSnapshot,
    },
    /// Active -> active with changed fields (start time or goal).
    UpdatedActive { current: SessionSnapshot },
    /// Inactive -> inactive.
    UpdatedInactive { current: SessionSnapshot },
}

/// Discriminant-only view of a [`Transition`], convenient in tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Started,
    Stopped,
    UpdatedActive,
    UpdatedInactive,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Started { .. } => TransitionKind::Started,
            Transition::Stopped { .. } => TransitionKind::Stopped,
            Transition::UpdatedActive { .. } => TransitionKind::UpdatedActive,
            Transition::UpdatedInactive { .. } => TransitionKind::UpdatedInactive,
        }
    }

    /// The snapshot the device holds after this transition.
    pub fn current(&self) -> &SessionSnapshot {
        match self {
            Transition::Started { current }
            | Transition::Stopped { current, .. }
            | Transition::UpdatedActive { current }
            | Transition::UpdatedInactive { current } => current,
        }
    }
}

/// Classify a snapshot change. Pure and total: an absent previous snapshot
/// counts as inactive.
pub fn classify(previous: Option<&SessionSnapshot>, current: &SessionSnapshot) -> Transition {
    let was_fasting = previous.map(|p| p.is_fasting).unwrap_or(false);
    match (was_fasting, current.is_fasting) {
        (false, true) => Transition::Started {
            current: current.clone(),
        },
        (true, false) => Transition::Stopped {
            previous: previous
                .cloned()
                .unwrap_or_else(SessionSnapshot::empty),
            current: current.clone(),
        },
        (true, true) => Transition::UpdatedActive {
            current: current.clone(),
        },
        (false, false) => Transition::UpdatedInactive {
            current: current.clone(),
        },
    }
}

/// Platform side-effect hooks, invoked once per transition.
///
/// Implementations refresh widgets, raise immediate notifications, and so on;
/// the default impls do nothing so platforms override only what they need.
pub trait TransitionHooks: Send + Sync {
    fn on_started(&self, _current: &SessionSnapshot) {}
    fn on_stopped(&self, _current: &SessionSnapshot) {}
    fn on_updated(&self, _current: &SessionSnapshot) {}
}

/// Hooks that do nothing; the default for headless embedders.
pub struct NoopHooks;

impl TransitionHooks for NoopHooks {}

/// Drives side effects from classified transitions.
///
/// Holds no mutable state of its own; everything it needs is passed in per
/// call or owned as shared immutable references.
pub struct TransitionEngine {
    store: Arc<SessionStore>,
    scheduler: NotificationScheduler,
    hooks: Box<dyn TransitionHooks>,
}

impl TransitionEngine {
    pub fn new(
        store: Arc<SessionStore>,
        scheduler: NotificationScheduler,
        hooks: Box<dyn TransitionHooks>,
    ) -> Self {
        Self {
            store,
            scheduler,
            hooks,
        }
    }

    /// Classify `previous -> current` and fire that transition's side effects
    /// exactly once.
    pub fn process(
        &self,
        previous: Option<&SessionSnapshot>,
        current: &SessionSnapshot,
    ) -> Transition {
        let transition = classify(previous, current);
        match &transition {
            Transition::Started { current } => {
                self.schedule_for(current);
                self.hooks.on_started(current);
            }
            Transition::Stopped { previous, current } => {
                self.scheduler.cancel_goal_alarms();
                let record = HistoryRecord {
                    start_time_epoch_ms: previous.start_time,
                    end_time_epoch_ms: now_ms(),
                    goal_id: previous.goal_id.clone(),
                };
                if let Err(e) = self.store.append_history(&record) {
                    warn!(error = %e, "failed to append completed session to history");
                }
                self.hooks.on_stopped(current);
            }
            Transition::UpdatedActive { current } => {
                self.scheduler.cancel_goal_alarms();
                self.schedule_for(current);
                self.hooks.on_updated(current);
            }
            Transition::UpdatedInactive { current } => {
                self.hooks.on_updated(current);
            }
        }
        transition
    }

    fn schedule_for(&self, current: &SessionSnapshot) {
        match goal::duration_ms(&current.goal_id) {
            Some(duration) => {
                if let Err(e) = self
                    .scheduler
                    .schedule_goal_alarms(current.start_time, duration)
                {
                    warn!(error = %e, goal = %current.goal_id, "goal alarm scheduling failed");
                }
            }
            None => {
                warn!(goal = %current.goal_id, "goal does not resolve to a duration, skipping alarms");
            }
        }
    }
}
