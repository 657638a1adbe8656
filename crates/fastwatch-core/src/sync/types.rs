//! Core types crossing the device-to-device channel.

use serde::{Deserialize, Serialize};

use crate::notify::NotificationType;
use crate::session::SessionSnapshot;

/// One remote change event as delivered by the transport.
///
/// Batches may contain several of these, unordered and possibly stale, and
/// may include echoes of this device's own publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Id of the device whose write produced this event.
    pub origin_device_id: String,
    pub snapshot: SessionSnapshot,
}

/// One-shot command messages sent between devices.
///
/// Unlike snapshot publishes these are imperative: the receiver acts once and
/// does not persist them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Ask the receiver to start a session at the given epoch-ms start time.
    StartFasting { start_time_ms: i64 },
    /// Ask the receiver to stop the current session.
    StopFasting,
    /// Ask the receiver to surface its start-time editor.
    UpdateStartTime,
    /// Ask the watch to open its app on the screen for a notification type.
    OpenWatchApp { notification_type: NotificationType },
}
