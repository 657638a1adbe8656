//! Core error types for fastwatch-core.
//!
//! This module defines the error hierarchy using thiserror. State violations
//! are surfaced to callers; transient I/O failures are logged at the point of
//! failure and carried as their own variants so callers can decide whether to
//! report them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fastwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Illegal state transitions requested by a caller
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Sync channel and codec errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Notification scheduling errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Precondition violations on the local mutation path.
///
/// These are user-visible failures: the caller reports them and the session
/// state is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// `start_fasting` called while a session is already active
    #[error("A fasting session is already running")]
    AlreadyFasting,

    /// `stop_fasting` called with no active session
    #[error("No fasting session is running")]
    NotFasting,

    /// `update_config` called with nothing to update
    #[error("Update requested without any fields to change")]
    NoOpUpdate,
}

/// Session store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Data directory could not be resolved
    #[error("Could not determine data directory")]
    NoDataDir,
}

/// Sync channel, codec, and device identity errors.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Channel transport failure (best-effort; callers log and continue)
    #[error("Channel error: {0}")]
    Channel(String),

    /// Received a command on a path this device does not understand
    #[error("Unknown message path: {0}")]
    UnknownPath(String),

    /// Command payload did not match the path's expected encoding
    #[error("Malformed payload for {path}: {message}")]
    MalformedPayload { path: String, message: String },

    /// Snapshot payload serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Device id file errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Device id file contained an unexpected value
    #[error("Invalid device ID format: {0}")]
    InvalidDeviceId(String),
}

/// Notification scheduling errors.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The underlying delayed-work primitive rejected the enqueue
    #[error("Failed to enqueue delayed work '{key}': {message}")]
    EnqueueFailed { key: String, message: String },

    /// The goal id does not resolve to a duration
    #[error("Unknown goal id: {0}")]
    UnknownGoal(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
