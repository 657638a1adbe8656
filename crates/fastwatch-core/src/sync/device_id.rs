// Device ID management for two-device sync
// Format: "fastwatch-<uuid>"

use std::fs;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

use crate::error::SyncError;
use crate::storage::data_dir;

const DEVICE_ID_FILE: &str = "device_id.txt";
const DEVICE_ID_PREFIX: &str = "fastwatch-";

/// Get or create the device ID at the specified path.
/// Creates a new device ID file if it doesn't exist.
///
/// # Arguments
/// * `path` - Directory path where device_id.txt is stored
///
/// # Returns
/// Device ID string in format "fastwatch-<uuid>"
pub fn get_or_create_device_id_at(path: &Path) -> Result<String, SyncError> {
    let device_id_path = path.join(DEVICE_ID_FILE);

    if device_id_path.exists() {
        let content = fs::read_to_string(&device_id_path)?;
        let device_id = content.trim().to_string();

        if device_id.starts_with(DEVICE_ID_PREFIX) {
            return Ok(device_id);
        }
        return Err(SyncError::InvalidDeviceId(device_id));
    }

    let uuid = Uuid::new_v4().to_string();
    let device_id = format!("{DEVICE_ID_PREFIX}{uuid}");

    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let mut file = fs::File::create(&device_id_path)?;
    writeln!(file, "{device_id}")?;

    Ok(device_id)
}

/// Get or create the device ID under the default data directory.
///
/// The sync ingress treats a failure here as "identity unknown" and falls
/// open rather than dropping remote events.
pub fn get_or_create_device_id() -> Result<String, SyncError> {
    let dir = data_dir().map_err(|e| {
        SyncError::Channel(format!("could not resolve data directory: {e}"))
    })?;
    get_or_create_device_id_at(&dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn device_id_format() {
        let temp_dir = TempDir::new().unwrap();
        let device_id = get_or_create_device_id_at(temp_dir.path()).unwrap();

        assert!(device_id.starts_with(DEVICE_ID_PREFIX));
        assert_eq!(device_id.len(), DEVICE_ID_PREFIX.len() + 36);
    }

    #[test]
    fn device_id_persists() {
        let temp_dir = TempDir::new().unwrap();

        let first = get_or_create_device_id_at(temp_dir.path()).unwrap();
        let second = get_or_create_device_id_at(temp_dir.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn device_id_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested/path");
        assert!(!nested.exists());

        let device_id = get_or_create_device_id_at(&nested).unwrap();

        assert!(nested.exists());
        assert!(device_id.starts_with(DEVICE_ID_PREFIX));
    }

    #[test]
    fn invalid_format_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(DEVICE_ID_FILE), "watch-123\n").unwrap();

        let result = get_or_create_device_id_at(temp_dir.path());
        assert!(matches!(result, Err(SyncError::InvalidDeviceId(_))));
    }

    #[test]
    fn ids_are_unique_per_directory() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();

        let id_a = get_or_create_device_id_at(dir_a.path()).unwrap();
        let id_b = get_or_create_device_id_at(dir_b.path()).unwrap();

        assert_ne!(id_a, id_b);
    }
}
