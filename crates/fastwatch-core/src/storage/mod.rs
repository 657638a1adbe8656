mod config;
mod store;

pub use config::{Config, SuggestionMode};
pub use store::SessionStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/fastwatch[-dev]/` based on FASTWATCH_ENV.
///
/// Set FASTWATCH_ENV=dev to use a development data directory, or
/// FASTWATCH_DATA_DIR to pin an explicit path (used by the CLI tests).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    if let Ok(explicit) = std::env::var("FASTWATCH_DATA_DIR") {
        let dir = PathBuf::from(explicit);
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FASTWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fastwatch-dev")
    } else {
        base_dir.join("fastwatch")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
    Ok(dir)
}
