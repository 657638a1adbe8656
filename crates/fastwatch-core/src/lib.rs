//! # Fastwatch Core Library
//!
//! This library provides the core business logic for Fastwatch, an
//! intermittent-fasting tracker that keeps one logical "current session"
//! consistent across a primary device and a companion wearable. The devices
//! share nothing but an asynchronous, unordered, at-most-once data channel;
//! consistency is last-write-wins by the writing device's clock.
//!
//! ## Architecture
//!
//! - **Session Store**: SQLite-backed snapshot row plus the append-only
//!   history of completed fasts
//! - **Mutation Service**: the local write path -- validate, persist,
//!   publish, then fire transition side effects
//! - **Sync**: echo-suppressing, stale-rejecting ingress over an abstract
//!   device-to-device channel
//! - **Transitions**: a pure classifier driving notifications, history
//!   appends, and platform hooks exactly once per state change
//! - **Reminders**: the two-alarm goal schedule plus the suggested-start
//!   engine (circular-mean moving average, bedtime offset, fixed time)
//!
//! ## Key Components
//!
//! - [`SessionStore`]: snapshot and history persistence
//! - [`MutationService`]: start/stop/update/force-sync operations
//! - [`SyncIngress`]: remote change application
//! - [`TransitionEngine`]: side-effect dispatch
//! - [`SuggestionEngine`]: recommended next start time
//! - [`RefreshCoalescer`]: debounced UI-refresh signals

pub mod error;
pub mod goal;
pub mod notify;
pub mod refresh;
pub mod service;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod sync;

pub use error::{ConfigError, CoreError, ScheduleError, StateError, StoreError, SyncError};
pub use notify::{
    DelayedWorkQueue, InMemoryWorkQueue, NotificationScheduler, NotificationType, ScheduleOutcome,
    WorkPayload,
};
pub use refresh::RefreshCoalescer;
pub use service::{CommandOutcome, MutationService};
pub use session::{
    classify, now_ms, HistoryRecord, NoopHooks, SessionSnapshot, Transition, TransitionEngine,
    TransitionHooks, TransitionKind,
};
pub use storage::{Config, SessionStore, SuggestionMode};
pub use suggest::{SuggestedTime, SuggestionEngine, SuggestionSource};
pub use sync::{ChangeEvent, NullChannel, RemoteChannel, SyncCommand, SyncHub, SyncIngress};
