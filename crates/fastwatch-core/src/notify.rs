//! Notification scheduling for the goal alarm pair and smart reminders.
//!
//! The scheduler computes absolute trigger times and hands clamped delays to
//! a delayed-work primitive behind the [`DelayedWorkQueue`] trait. Scheduling
//! is unique-by-key: re-scheduling a key replaces the pending item instead of
//! duplicating it. Goal alarms and smart reminders use distinct keys so the
//! two schedules never collide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ScheduleError;
use crate::session::now_ms;

/// One hour in milliseconds.
const HOUR_MS: i64 = 60 * 60 * 1000;

pub const KEY_FASTING_COMPLETE: &str = "fasting-complete";
pub const KEY_ONE_HOUR_LEFT: &str = "fasting-one-hour-left";
pub const KEY_SMART_REMINDER: &str = "smart-reminder";

/// Which alarm a scheduled work item should raise when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FastingComplete,
    OneHourLeft,
    SmartReminder,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::FastingComplete => "fasting_complete",
            NotificationType::OneHourLeft => "one_hour_left",
            NotificationType::SmartReminder => "smart_reminder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fasting_complete" => Some(NotificationType::FastingComplete),
            "one_hour_left" => Some(NotificationType::OneHourLeft),
            "smart_reminder" => Some(NotificationType::SmartReminder),
            _ => None,
        }
    }
}

/// Input handed to the delayed-work primitive for each alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPayload {
    pub notification_type: NotificationType,
    pub fasting_start_millis: i64,
}

/// Outcome of a periodic scheduling attempt.
///
/// `Retry` tells the invoking periodic scheduler to try again later instead
/// of propagating the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    Retry,
}

/// Delayed-work primitive: platform alarm/work queue behind a trait.
pub trait DelayedWorkQueue: Send + Sync {
    /// Schedule `payload` to fire after `delay_ms`, replacing any pending
    /// item under the same key.
    fn enqueue_unique(
        &self,
        key: &str,
        delay_ms: i64,
        payload: WorkPayload,
    ) -> Result<(), ScheduleError>;

    /// Cancel the pending item under `key`, if any.
    fn cancel(&self, key: &str);
}

/// Absolute trigger times for the two-alarm goal schedule.
///
/// Returns `(completion, one_hour_before)` in epoch ms.
pub fn goal_triggers(start_ms: i64, goal_duration_ms: i64) -> (i64, i64) {
    let completion = start_ms.saturating_add(goal_duration_ms);
    (completion, completion - HOUR_MS)
}

/// Clamp an absolute trigger to a non-negative delay from `now`.
pub fn delay_from(trigger_ms: i64, now: i64) -> i64 {
    (trigger_ms - now).max(0)
}

/// Schedules and cancels the fixed goal alarm pair and smart reminders.
pub struct NotificationScheduler {
    queue: Arc<dyn DelayedWorkQueue>,
}

impl NotificationScheduler {
    pub fn new(queue: Arc<dyn DelayedWorkQueue>) -> Self {
        Self { queue }
    }

    /// Schedule both goal alarms for a session.
    pub fn schedule_goal_alarms(
        &self,
        start_ms: i64,
        goal_duration_ms: i64,
    ) -> Result<(), ScheduleError> {
        self.schedule_goal_alarms_at(start_ms, goal_duration_ms, now_ms())
    }

    /// Schedule both goal alarms with an explicit clock.
    pub fn schedule_goal_alarms_at(
        &self,
        start_ms: i64,
        goal_duration_ms: i64,
        now: i64,
    ) -> Result<(), ScheduleError> {
        let (completion, one_hour_before) = goal_triggers(start_ms, goal_duration_ms);
        self.queue.enqueue_unique(
            KEY_ONE_HOUR_LEFT,
            delay_from(one_hour_before, now),
            WorkPayload {
                notification_type: NotificationType::OneHourLeft,
                fasting_start_millis: start_ms,
            },
        )?;
        self.queue.enqueue_unique(
            KEY_FASTING_COMPLETE,
            delay_from(completion, now),
            WorkPayload {
                notification_type: NotificationType::FastingComplete,
                fasting_start_millis: start_ms,
            },
        )?;
        debug!(start_ms, goal_duration_ms, "goal alarms scheduled");
        Ok(())
    }

    /// Cancel every pending goal alarm. Coarse-grained on purpose: at most
    /// one goal schedule is ever active.
    pub fn cancel_goal_alarms(&self) {
        self.queue.cancel(KEY_ONE_HOUR_LEFT);
        self.queue.cancel(KEY_FASTING_COMPLETE);
    }

    /// Schedule the smart reminder for `trigger_ms`.
    ///
    /// Enqueue failures are caught and reported as [`ScheduleOutcome::Retry`]
    /// so the periodic re-scheduler can back off rather than crash.
    pub fn schedule_smart_reminder(&self, trigger_ms: i64, now: i64) -> ScheduleOutcome {
        let result = self.queue.enqueue_unique(
            KEY_SMART_REMINDER,
            delay_from(trigger_ms, now),
            WorkPayload {
                notification_type: NotificationType::SmartReminder,
                fasting_start_millis: trigger_ms,
            },
        );
        match result {
            Ok(()) => ScheduleOutcome::Scheduled,
            Err(e) => {
                warn!(error = %e, "smart reminder enqueue failed, will retry");
                ScheduleOutcome::Retry
            }
        }
    }

    /// Cancel a pending smart reminder without touching goal alarms.
    pub fn cancel_smart_reminder(&self) {
        self.queue.cancel(KEY_SMART_REMINDER);
    }
}

/// A pending item recorded by [`InMemoryWorkQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledWork {
    pub delay_ms: i64,
    pub payload: WorkPayload,
}

/// In-memory delayed-work queue for tests and headless embedders.
#[derive(Default)]
pub struct InMemoryWorkQueue {
    items: Mutex<HashMap<String, ScheduledWork>>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending item under `key`, if any.
    pub fn pending(&self, key: &str) -> Option<ScheduledWork> {
        self.items.lock().unwrap().get(key).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

impl DelayedWorkQueue for InMemoryWorkQueue {
    fn enqueue_unique(
        &self,
        key: &str,
        delay_ms: i64,
        payload: WorkPayload,
    ) -> Result<(), ScheduleError> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), ScheduledWork { delay_ms, payload });
        Ok(())
    }

    fn cancel(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }
}
