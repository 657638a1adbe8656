//! Cross-device synchronization layer.
//!
//! Mirrors the session snapshot between the primary device and its companion
//! over a best-effort, unordered, at-most-once channel. Conflict resolution
//! is last-write-wins by the writing device's clock; a device never reacts to
//! echoes of its own publishes.

pub mod channel;
pub mod codec;
pub mod device_id;
pub mod ingress;
pub mod types;

pub use channel::{NullChannel, RemoteChannel, SyncHub, HubEndpoint};
pub use device_id::{get_or_create_device_id, get_or_create_device_id_at};
pub use ingress::SyncIngress;
pub use types::{ChangeEvent, SyncCommand};
