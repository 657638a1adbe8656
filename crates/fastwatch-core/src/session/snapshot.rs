use serde::{Deserialize, Serialize};

/// The single current-session record on a device.
///
/// Exactly one snapshot exists per device; every write overwrites it in place
/// and stamps `update_timestamp` with the writing device's clock. The
/// timestamp is the sync tie-breaker: whichever device wrote last wins.
///
/// Serialized field names match the cross-device wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_fasting: bool,
    /// Epoch ms when the current session began. Meaningless when not fasting.
    pub start_time: i64,
    /// Target duration identifier, e.g. "16:8". Resolved externally.
    pub goal_id: String,
    /// Epoch ms of the last write on the writing device.
    pub update_timestamp: i64,
}

impl SessionSnapshot {
    /// Snapshot stored on a device that has never fasted.
    pub fn empty() -> Self {
        Self {
            is_fasting: false,
            start_time: 0,
            goal_id: "16:8".to_string(),
            update_timestamp: 0,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// One completed fasting session, keyed by its start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub start_time_epoch_ms: i64,
    pub end_time_epoch_ms: i64,
    pub goal_id: String,
}

impl HistoryRecord {
    /// Elapsed fasting time in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.end_time_epoch_ms.saturating_sub(self.start_time_epoch_ms)
    }
}

/// Current wall-clock time as epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_inactive() {
        let snap = SessionSnapshot::empty();
        assert!(!snap.is_fasting);
        assert_eq!(snap.start_time, 0);
        assert_eq!(snap.update_timestamp, 0);
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let snap = SessionSnapshot {
            is_fasting: true,
            start_time: 1000,
            goal_id: "18:6".to_string(),
            update_timestamp: 2000,
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["isFasting"], true);
        assert_eq!(json["startTime"], 1000);
        assert_eq!(json["goalId"], "18:6");
        assert_eq!(json["updateTimestamp"], 2000);
    }

    #[test]
    fn history_duration() {
        let record = HistoryRecord {
            start_time_epoch_ms: 1_000,
            end_time_epoch_ms: 58_601_000,
            goal_id: "16:8".to_string(),
        };
        assert_eq!(record.duration_ms(), 58_600_000);
    }
}
