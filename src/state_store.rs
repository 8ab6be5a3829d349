use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::models::PersistedState;
use crate::utils::error::{AppError, Result};

/// Durable home of the last known snapshot per product.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns an empty state when nothing has been saved yet.
    async fn load(&self) -> Result<PersistedState>;

    async fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Stores the state as a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_temp(&self, temp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<PersistedState> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting empty", self.path.display());
                return Ok(PersistedState::new());
            }
            Err(e) => return Err(AppError::persistence(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(PersistedState::new());
        }

        serde_json::from_str(&contents).map_err(|e| AppError::persistence(&self.path, e))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::persistence(&self.path, e))?;
        }

        // Readers only ever see the old file or the complete new one
        let temp_path = self.temp_path();
        if let Err(e) = self.write_temp(&temp_path, json.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::persistence(&self.path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::persistence(&self.path, e));
        }

        tracing::debug!("Saved {} entries to {}", state.len(), self.path.display());
        Ok(())
    }
}
