//! Suggested fasting-start engine.
//!
//! Computes a recommended next start time from the history log through a
//! prioritized strategy chain. Start times are cyclical (time of day), so
//! the moving average is a circular mean: each sample maps onto the unit
//! circle, the mean angle comes back through `atan2`. Averaging 23:30 and
//! 00:30 therefore lands near midnight instead of noon.

use std::f64::consts::PI;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::notify::{NotificationScheduler, ScheduleOutcome};
use crate::session::now_ms;
use crate::storage::{Config, SessionStore, SuggestionMode};

/// Minutes in a day.
const DAY_MINUTES: f64 = 1440.0;

/// Trailing window the moving average draws from.
pub const MOVING_AVERAGE_WINDOW_DAYS: i64 = 14;
/// At most this many of the newest samples are averaged.
pub const MOVING_AVERAGE_MAX_SAMPLES: usize = 10;
/// Fewer samples than this and the moving average abstains.
pub const MOVING_AVERAGE_MIN_SAMPLES: usize = 3;

/// Which strategy produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    MovingAverage,
    BedtimeBased,
    FixedTime,
}

/// A recommended next fasting start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTime {
    /// Absolute trigger: today at the suggested minute if still ahead,
    /// else tomorrow.
    pub time_ms: i64,
    pub minutes_of_day: u32,
    pub reasoning: String,
    pub source: SuggestionSource,
}

/// Circular mean of minute-of-day samples.
///
/// Returns `None` for an empty slice.
pub fn circular_mean_minutes(samples: &[u32]) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }
    let (mut sin_sum, mut cos_sum) = (0.0f64, 0.0f64);
    for &minutes in samples {
        let theta = 2.0 * PI * f64::from(minutes) / DAY_MINUTES;
        sin_sum += theta.sin();
        cos_sum += theta.cos();
    }
    let n = samples.len() as f64;
    let mut mean_angle = (sin_sum / n).atan2(cos_sum / n);
    if mean_angle < 0.0 {
        mean_angle += 2.0 * PI;
    }
    let minutes = (mean_angle / (2.0 * PI) * DAY_MINUTES).round() as u32;
    Some(minutes % 1440)
}

/// Minutes since local midnight for an epoch-ms timestamp.
pub fn minutes_of_day_local(epoch_ms: i64) -> Option<u32> {
    let local = Local.timestamp_millis_opt(epoch_ms).single()?;
    Some(local.hour() * 60 + local.minute())
}

/// Resolve a minute-of-day to the next time it occurs after `now`.
pub fn next_occurrence_ms(minutes_of_day: u32, now: DateTime<Local>) -> i64 {
    if let Some(today) = local_at(now.date_naive(), minutes_of_day) {
        if today > now {
            return today.timestamp_millis();
        }
    }
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| local_at(tomorrow, minutes_of_day))
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

fn local_at(date: NaiveDate, minutes_of_day: u32) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(minutes_of_day / 60, minutes_of_day % 60, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

/// Render a minute-of-day as `HH:MM`.
pub fn format_minutes_of_day(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Strategy chain over history and configuration.
pub struct SuggestionEngine {
    store: Arc<SessionStore>,
    config: Config,
}

impl SuggestionEngine {
    pub fn new(store: Arc<SessionStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Compute the suggestion for the configured mode.
    pub fn compute_suggested_start(&self) -> Result<SuggestedTime, CoreError> {
        self.compute_suggested_start_at(Local::now())
    }

    /// Compute with an explicit clock.
    pub fn compute_suggested_start_at(
        &self,
        now: DateTime<Local>,
    ) -> Result<SuggestedTime, CoreError> {
        match self.config.smart_reminder_mode {
            SuggestionMode::Auto => match self.moving_average(now)? {
                Some(suggestion) => Ok(suggestion),
                None => Ok(self.bedtime_or_fixed(now, None)),
            },
            SuggestionMode::MovingAverageOnly => match self.moving_average(now)? {
                Some(suggestion) => Ok(suggestion),
                None => Ok(self.bedtime_or_fixed(
                    now,
                    Some("not enough recent fasts for a moving average; "),
                )),
            },
            SuggestionMode::BedtimeOnly => Ok(self.bedtime_or_fixed(now, None)),
            SuggestionMode::FixedTime => Ok(self.fixed(now, "")),
        }
    }

    /// Recompute and (re)schedule the smart reminder alarm.
    ///
    /// Returns `None` when smart reminders are disabled (any pending
    /// reminder is cancelled).
    pub fn schedule_smart_reminder(
        &self,
        scheduler: &NotificationScheduler,
    ) -> Result<Option<ScheduleOutcome>, CoreError> {
        if !self.config.smart_reminders_enabled {
            scheduler.cancel_smart_reminder();
            return Ok(None);
        }
        let suggestion = self.compute_suggested_start()?;
        Ok(Some(
            scheduler.schedule_smart_reminder(suggestion.time_ms, now_ms()),
        ))
    }

    fn moving_average(&self, now: DateTime<Local>) -> Result<Option<SuggestedTime>, CoreError> {
        let records = self.store.history_recent(
            MOVING_AVERAGE_WINDOW_DAYS,
            MOVING_AVERAGE_MAX_SAMPLES,
            now.timestamp_millis(),
        )?;
        let samples: Vec<u32> = records
            .iter()
            .filter_map(|r| minutes_of_day_local(r.start_time_epoch_ms))
            .collect();
        if samples.len() < MOVING_AVERAGE_MIN_SAMPLES {
            return Ok(None);
        }
        let minutes = match circular_mean_minutes(&samples) {
            Some(minutes) => minutes,
            None => return Ok(None),
        };
        Ok(Some(SuggestedTime {
            time_ms: next_occurrence_ms(minutes, now),
            minutes_of_day: minutes,
            reasoning: format!(
                "average of your last {} fast starts over {} days",
                samples.len(),
                MOVING_AVERAGE_WINDOW_DAYS
            ),
            source: SuggestionSource::MovingAverage,
        }))
    }

    fn bedtime_or_fixed(&self, now: DateTime<Local>, fallback_note: Option<&str>) -> SuggestedTime {
        let note = fallback_note.unwrap_or("");
        match self.config.bedtime_minutes {
            Some(bedtime) => {
                let offset = self.config.bedtime_offset_hours * 60;
                let minutes = (i64::from(bedtime) - i64::from(offset)).rem_euclid(1440) as u32;
                SuggestedTime {
                    time_ms: next_occurrence_ms(minutes, now),
                    minutes_of_day: minutes,
                    reasoning: format!(
                        "{note}{} hours before your bedtime at {}",
                        self.config.bedtime_offset_hours,
                        format_minutes_of_day(bedtime)
                    ),
                    source: SuggestionSource::BedtimeBased,
                }
            }
            None => self.fixed(now, "no bedtime configured; "),
        }
    }

    fn fixed(&self, now: DateTime<Local>, note: &str) -> SuggestedTime {
        let minutes = self.config.fixed_fasting_start_minutes % 1440;
        SuggestedTime {
            time_ms: next_occurrence_ms(minutes, now),
            minutes_of_day: minutes,
            reasoning: format!(
                "{note}your configured start time of {}",
                format_minutes_of_day(minutes)
            ),
            source: SuggestionSource::FixedTime,
        }
    }
}
