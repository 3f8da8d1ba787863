//! JSON file state store

use super::StateStore;
use crate::core::ProgressState;
use anyhow::{Context, Result};
use std::fs::Permissions;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default state file name, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "canvas_install_state.json";

/// The state file carries the collected passwords; owner access only
const STATE_FILE_MODE: u32 = 0o600;

/// Stores progress as pretty-printed JSON in a single file.
///
/// Writes go to `<file>.tmp` first and are renamed into place, so a crash
/// mid-write never leaves a half-written state file behind. The file is
/// readable by its owner only.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Default for JsonFileStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

#[async_trait::async_trait]
impl StateStore for JsonFileStateStore {
    async fn save(&self, state: &ProgressState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state).context("Failed to serialize progress")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.temp_path();
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(STATE_FILE_MODE)
            .open(&temp)
            .await
            .with_context(|| format!("Failed to create {}", temp.display()))?;
        // `mode` only applies on creation; a stale temp file keeps its bits.
        file.set_permissions(Permissions::from_mode(STATE_FILE_MODE))
            .await
            .with_context(|| format!("Failed to restrict {}", temp.display()))?;
        file.write_all(&json)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", temp.display()))?;
        drop(file);

        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("Failed to move progress into {}", self.path.display()))?;

        debug!(
            "Saved progress (next step index {}) to {}",
            state.current_step_index,
            self.path.display()
        );
        Ok(())
    }

    async fn load(&self) -> Option<ProgressState> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read state file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(
                    "Ignoring unreadable state file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        for path in [self.path.clone(), self.temp_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstallConfig;
    use uuid::Uuid;

    fn sample_state(index: usize) -> ProgressState {
        let config = InstallConfig {
            domain: "canvas.example.com".to_string(),
            canvas_password: "s3cret".to_string(),
            skip_ssl: true,
            ..InstallConfig::default()
        };
        ProgressState::new(Uuid::new_v4(), index, config)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));

        let state = sample_state(5);
        store.save(&state).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state(1)).await.unwrap();
        store.save(&sample_state(2)).await.unwrap();

        assert_eq!(store.load().await.unwrap().current_step_index, 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"current_step_index\": 3, \"config\":").unwrap();

        let store = JsonFileStateStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_stale_temp_file_does_not_affect_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state(3)).await.unwrap();
        std::fs::write(store.temp_path(), "garbage").unwrap();

        assert_eq!(store.load().await.unwrap().current_step_index, 3);
        store.clear().await.unwrap();
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state(1)).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_state_file_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));

        std::fs::write(store.temp_path(), "stale").unwrap();
        std::fs::set_permissions(store.temp_path(), Permissions::from_mode(0o644)).unwrap();

        store.save(&sample_state(2)).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("s3cret"));
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state.json"));
        store.save(&sample_state(7)).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["current_step_index"], 7);
        assert_eq!(value["config"]["domain"], "canvas.example.com");
        assert!(value["timestamp"].is_string());
    }
}
