use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use fastwatch_core::{
    Config, InMemoryWorkQueue, MutationService, NoopHooks, NotificationScheduler, NullChannel,
    SessionStore, TransitionEngine,
};

/// The wired-up component graph for one CLI invocation.
///
/// The CLI is single-device, so publishes go to the null channel; a paired
/// deployment would hand the service a real transport instead.
pub struct Components {
    pub store: Arc<SessionStore>,
    pub service: MutationService,
}

pub fn open_components() -> Result<Components, Box<dyn Error>> {
    let store = Arc::new(SessionStore::open()?);
    let queue = Arc::new(InMemoryWorkQueue::new());
    let engine = Arc::new(TransitionEngine::new(
        store.clone(),
        NotificationScheduler::new(queue),
        Box::new(NoopHooks),
    ));
    let service = MutationService::new(store.clone(), Arc::new(NullChannel), engine);
    Ok(Components { store, service })
}

pub fn load_config() -> Result<Config, Box<dyn Error>> {
    Ok(Config::load()?)
}

/// Render an epoch-ms timestamp in local time.
pub fn format_epoch_ms(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("{epoch_ms} ms"),
    }
}

/// Render a millisecond duration as `15h 04m`.
pub fn format_duration_ms(duration_ms: i64) -> String {
    let minutes = duration_ms.max(0) / 60_000;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Parse a user-supplied time: RFC 3339, local `YYYY-MM-DD HH:MM`, or raw
/// epoch milliseconds.
pub fn parse_time_arg(raw: &str) -> Result<i64, Box<dyn Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        if let Some(local) = Local.from_local_datetime(&naive).earliest() {
            return Ok(local.timestamp_millis());
        }
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return Ok(ms);
    }
    Err(format!("could not parse time '{raw}' (try RFC 3339 or 'YYYY-MM-DD HH:MM')").into())
}

/// Parse `HH:MM` into minutes since midnight.
pub fn parse_minutes_arg(raw: &str) -> Result<u32, Box<dyn Error>> {
    let (hours, minutes) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{raw}'"))?;
    let hours: u32 = hours.parse()?;
    let minutes: u32 = minutes.parse()?;
    if hours > 23 || minutes > 59 {
        return Err(format!("'{raw}' is not a valid time of day").into());
    }
    Ok(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_arg_parses() {
        assert_eq!(parse_minutes_arg("22:30").unwrap(), 22 * 60 + 30);
        assert_eq!(parse_minutes_arg("00:00").unwrap(), 0);
        assert!(parse_minutes_arg("24:00").is_err());
        assert!(parse_minutes_arg("2230").is_err());
    }

    #[test]
    fn raw_epoch_ms_accepted() {
        assert_eq!(parse_time_arg("1700000000000").unwrap(), 1_700_000_000_000);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_ms(15 * 3_600_000 + 4 * 60_000), "15h 04m");
        assert_eq!(format_duration_ms(-5), "0h 00m");
    }
}
