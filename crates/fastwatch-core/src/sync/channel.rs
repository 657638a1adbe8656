//! The device-to-device channel abstraction.
//!
//! The real transport (phone/wearable data layer) is out of scope; the core
//! only assumes a best-effort, unordered, at-most-once carrier behind the
//! [`RemoteChannel`] trait. Publishes are fire-and-forget: failures are
//! logged by callers and corrected by the next manual sync.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::SyncError;
use crate::session::SessionSnapshot;

use super::codec;
use super::types::{ChangeEvent, SyncCommand};

/// Outbound half of the inter-device transport.
pub trait RemoteChannel: Send + Sync {
    /// Mirror a snapshot write onto the shared logical path. Best effort.
    fn publish(&self, snapshot: &SessionSnapshot) -> Result<(), SyncError>;

    /// Send a one-shot command to the peer device. Best effort.
    fn send_command(&self, command: &SyncCommand) -> Result<(), SyncError>;
}

/// Channel for single-device operation: publishes go nowhere.
pub struct NullChannel;

impl RemoteChannel for NullChannel {
    fn publish(&self, snapshot: &SessionSnapshot) -> Result<(), SyncError> {
        debug!(ts = snapshot.update_timestamp, "publish dropped (no peer channel)");
        Ok(())
    }

    fn send_command(&self, _command: &SyncCommand) -> Result<(), SyncError> {
        Ok(())
    }
}

struct HubInner {
    /// Pending change events per endpoint, in arrival order.
    change_inboxes: HashMap<String, Vec<ChangeEvent>>,
    /// Pending raw command messages per endpoint as (path, payload).
    command_inboxes: HashMap<String, Vec<(String, Vec<u8>)>>,
}

/// In-process transport linking endpoints through shared inboxes.
///
/// Stands in for the platform data layer in tests and demos: each endpoint's
/// publish fans out one change event (tagged with the publisher's id) to
/// every other endpoint. Delivery is whatever the test makes of it -- events
/// sit in the inbox until drained, so batching, reordering, and loss are all
/// expressible.
pub struct SyncHub {
    inner: Arc<Mutex<HubInner>>,
}

impl SyncHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                change_inboxes: HashMap::new(),
                command_inboxes: HashMap::new(),
            })),
        }
    }

    /// Register an endpoint for `device_id` and return its channel handle.
    pub fn endpoint(&self, device_id: &str) -> HubEndpoint {
        let mut inner = self.inner.lock().unwrap();
        inner
            .change_inboxes
            .entry(device_id.to_string())
            .or_default();
        inner
            .command_inboxes
            .entry(device_id.to_string())
            .or_default();
        HubEndpoint {
            device_id: device_id.to_string(),
            inner: self.inner.clone(),
        }
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One device's handle on a [`SyncHub`].
pub struct HubEndpoint {
    device_id: String,
    inner: Arc<Mutex<HubInner>>,
}

impl HubEndpoint {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Take every change event queued for this endpoint, as one batch.
    pub fn drain_changes(&self) -> Vec<ChangeEvent> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .change_inboxes
            .get_mut(&self.device_id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Take and decode every queued command for this endpoint.
    ///
    /// Messages that fail to decode are dropped with their error.
    pub fn drain_commands(&self) -> Vec<Result<SyncCommand, SyncError>> {
        let raw = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .command_inboxes
                .get_mut(&self.device_id)
                .map(std::mem::take)
                .unwrap_or_default()
        };
        raw.iter()
            .map(|(path, payload)| codec::decode_command(path, payload))
            .collect()
    }
}

impl RemoteChannel for HubEndpoint {
    fn publish(&self, snapshot: &SessionSnapshot) -> Result<(), SyncError> {
        // Round-trip through the codec so tests exercise the real payload.
        let payload = codec::encode_snapshot(snapshot)?;
        let snapshot = codec::decode_snapshot(&payload)?;
        let event = ChangeEvent {
            origin_device_id: self.device_id.clone(),
            snapshot,
        };
        let mut inner = self.inner.lock().unwrap();
        for (id, inbox) in inner.change_inboxes.iter_mut() {
            if id != &self.device_id {
                inbox.push(event.clone());
            }
        }
        Ok(())
    }

    fn send_command(&self, command: &SyncCommand) -> Result<(), SyncError> {
        let (path, payload) = codec::encode_command(command);
        let mut inner = self.inner.lock().unwrap();
        for (id, inbox) in inner.command_inboxes.iter_mut() {
            if id != &self.device_id {
                inbox.push((path.to_string(), payload.clone()));
            }
        }
        Ok(())
    }
}
