//! Fasting goal resolution.
//!
//! Goals are identified by strings in the `"F:E"` convention, where `F` is the
//! fasting window in hours and `E` the eating window ("16:8" fasts for 16
//! hours). The store and sync layers treat goal ids as opaque; only the
//! notification scheduler needs the duration.

/// Resolve a goal id to its fasting duration in milliseconds.
///
/// Returns `None` for ids that do not follow the hour-based `"F:E"`
/// convention or whose windows do not cover a full day.
pub fn duration_ms(goal_id: &str) -> Option<i64> {
    let (fast, eat) = goal_id.split_once(':')?;
    let fast: i64 = fast.trim().parse().ok()?;
    let eat: i64 = eat.trim().parse().ok()?;
    if fast < 1 || eat < 1 || fast + eat != 24 {
        return None;
    }
    Some(fast.saturating_mul(60).saturating_mul(60).saturating_mul(1000))
}

/// Resolve a goal id to its fasting duration in hours.
pub fn duration_hours(goal_id: &str) -> Option<i64> {
    duration_ms(goal_id).map(|ms| ms / 3_600_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_presets_resolve() {
        assert_eq!(duration_ms("16:8"), Some(16 * 3_600_000));
        assert_eq!(duration_ms("18:6"), Some(18 * 3_600_000));
        assert_eq!(duration_ms("20:4"), Some(20 * 3_600_000));
        assert_eq!(duration_ms("23:1"), Some(23 * 3_600_000));
    }

    #[test]
    fn malformed_ids_rejected() {
        assert_eq!(duration_ms(""), None);
        assert_eq!(duration_ms("16"), None);
        assert_eq!(duration_ms("16:9"), None); // does not cover a day
        assert_eq!(duration_ms("0:24"), None);
        assert_eq!(duration_ms("sixteen:eight"), None);
    }

    #[test]
    fn hours_helper() {
        assert_eq!(duration_hours("18:6"), Some(18));
        assert_eq!(duration_hours("junk"), None);
    }
}
