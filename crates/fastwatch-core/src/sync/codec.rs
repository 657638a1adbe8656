//! Wire codec for the sync channel.
//!
//! Snapshot publishes travel as JSON on a fixed logical path; one-shot
//! commands each get their own path with a minimal binary payload:
//! - start: the start time as 8 big-endian bytes
//! - stop / update-start-time: empty
//! - open-watch-app: the notification type name as UTF-8

use crate::error::SyncError;
use crate::notify::NotificationType;
use crate::session::SessionSnapshot;

use super::types::SyncCommand;

/// Logical path carrying snapshot state publishes.
pub const SESSION_STATE_PATH: &str = "/fasting/session";

pub const START_FASTING_PATH: &str = "/fasting/command/start";
pub const STOP_FASTING_PATH: &str = "/fasting/command/stop";
pub const UPDATE_START_TIME_PATH: &str = "/fasting/command/update-start-time";
pub const OPEN_WATCH_APP_PATH: &str = "/fasting/command/open-watch-app";

/// Encode a snapshot for publishing.
pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<Vec<u8>, SyncError> {
    Ok(serde_json::to_vec(snapshot)?)
}

/// Decode a published snapshot payload.
pub fn decode_snapshot(payload: &[u8]) -> Result<SessionSnapshot, SyncError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Encode a command into its path and payload bytes.
pub fn encode_command(command: &SyncCommand) -> (&'static str, Vec<u8>) {
    match command {
        SyncCommand::StartFasting { start_time_ms } => {
            (START_FASTING_PATH, start_time_ms.to_be_bytes().to_vec())
        }
        SyncCommand::StopFasting => (STOP_FASTING_PATH, Vec::new()),
        SyncCommand::UpdateStartTime => (UPDATE_START_TIME_PATH, Vec::new()),
        SyncCommand::OpenWatchApp { notification_type } => (
            OPEN_WATCH_APP_PATH,
            notification_type.as_str().as_bytes().to_vec(),
        ),
    }
}

/// Decode a received command from its path and payload bytes.
pub fn decode_command(path: &str, payload: &[u8]) -> Result<SyncCommand, SyncError> {
    match path {
        START_FASTING_PATH => {
            let bytes: [u8; 8] =
                payload
                    .try_into()
                    .map_err(|_| SyncError::MalformedPayload {
                        path: path.to_string(),
                        message: format!("expected 8 bytes, got {}", payload.len()),
                    })?;
            Ok(SyncCommand::StartFasting {
                start_time_ms: i64::from_be_bytes(bytes),
            })
        }
        STOP_FASTING_PATH => Ok(SyncCommand::StopFasting),
        UPDATE_START_TIME_PATH => Ok(SyncCommand::UpdateStartTime),
        OPEN_WATCH_APP_PATH => {
            let name = std::str::from_utf8(payload).map_err(|e| SyncError::MalformedPayload {
                path: path.to_string(),
                message: e.to_string(),
            })?;
            let notification_type =
                NotificationType::parse(name).ok_or_else(|| SyncError::MalformedPayload {
                    path: path.to_string(),
                    message: format!("unknown notification type '{name}'"),
                })?;
            Ok(SyncCommand::OpenWatchApp { notification_type })
        }
        other => Err(SyncError::UnknownPath(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_payload_uses_wire_names() {
        let snapshot = SessionSnapshot {
            is_fasting: true,
            start_time: 99,
            goal_id: "20:4".to_string(),
            update_timestamp: 100,
        };
        let bytes = encode_snapshot(&snapshot).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["isFasting"], true);
        assert_eq!(json["updateTimestamp"], 100);
        assert_eq!(decode_snapshot(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn start_command_is_eight_big_endian_bytes() {
        let command = SyncCommand::StartFasting {
            start_time_ms: 0x0102_0304_0506_0708,
        };
        let (path, payload) = encode_command(&command);
        assert_eq!(path, START_FASTING_PATH);
        assert_eq!(payload, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(decode_command(path, &payload).unwrap(), command);
    }

    #[test]
    fn empty_payload_commands() {
        for command in [SyncCommand::StopFasting, SyncCommand::UpdateStartTime] {
            let (path, payload) = encode_command(&command);
            assert!(payload.is_empty());
            assert_eq!(decode_command(path, &payload).unwrap(), command);
        }
    }

    #[test]
    fn open_watch_app_carries_type_name() {
        let command = SyncCommand::OpenWatchApp {
            notification_type: NotificationType::FastingComplete,
        };
        let (path, payload) = encode_command(&command);
        assert_eq!(payload, b"fasting_complete");
        assert_eq!(decode_command(path, &payload).unwrap(), command);
    }

    #[test]
    fn malformed_payloads_rejected() {
        assert!(matches!(
            decode_command(START_FASTING_PATH, &[1, 2, 3]),
            Err(SyncError::MalformedPayload { .. })
        ));
        assert!(matches!(
            decode_command(OPEN_WATCH_APP_PATH, b"no_such_type"),
            Err(SyncError::MalformedPayload { .. })
        ));
        assert!(matches!(
            decode_command("/fasting/other", &[]),
            Err(SyncError::UnknownPath(_))
        ));
    }
}
