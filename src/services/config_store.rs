//! ConfigStore: the free-form JSON settings blob.
//!
//! Keys are not interpreted here apart from the media slot paths. The file is
//! re-read on every access; admin writes replace it atomically.

use crate::{models::media::MediaField, services::files::write_atomic};
use serde_json::{Map, Value};
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};

pub type ConfigMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write config: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current config. A missing or unreadable file yields an empty object.
    pub async fn load(&self) -> ConfigMap {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return ConfigMap::new(),
            Err(err) => {
                error!("error reading config file {}: {}", self.path.display(), err);
                return ConfigMap::new();
            }
        };

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                error!("config file {} is not a JSON object", self.path.display());
                ConfigMap::new()
            }
            Err(err) => {
                error!("error parsing config file {}: {}", self.path.display(), err);
                ConfigMap::new()
            }
        }
    }

    pub async fn save(&self, config: &ConfigMap) -> Result<(), ConfigError> {
        let json = serde_json::to_vec_pretty(config)?;
        write_atomic(&self.path, &json).await?;
        let saved = serde_json::Value::Object(config.clone());
        info!("configuration saved: {}", saved);
        Ok(())
    }

    /// Replace the config with an empty object.
    pub async fn reset(&self) -> Result<(), ConfigError> {
        write_atomic(&self.path, b"{}").await?;
        info!("configuration reset");
        Ok(())
    }

    /// Path of `field` when the poll is playable.
    ///
    /// Both slots must be configured and present on disk; otherwise neither
    /// is served.
    pub async fn playable_path(&self, field: MediaField) -> Option<PathBuf> {
        let config = self.load().await;
        let mut selected = None;
        for slot in MediaField::ALL {
            let path = slot_path(&config, slot)?;
            if !fs::try_exists(&path).await.unwrap_or(false) {
                return None;
            }
            if slot == field {
                selected = Some(path);
            }
        }
        selected
    }
}

/// Path configured for a media slot, if any.
fn slot_path(config: &ConfigMap, field: MediaField) -> Option<PathBuf> {
    config
        .get(field.as_str())
        .and_then(Value::as_str)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_or_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::new(&path);
        assert!(store.load().await.is_empty());

        fs::write(&path, b"{not json").await.unwrap();
        assert!(store.load().await.is_empty());

        fs::write(&path, b"[1, 2]").await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn saved_entries_round_trip_and_reset_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::new(&path);

        let mut config = ConfigMap::new();
        config.insert("video1".into(), json!("/srv/videos/video1.mp4"));
        config.insert("title".into(), json!("Which one?"));
        store.save(&config).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded, config);
        assert_eq!(
            slot_path(&loaded, MediaField::Video1),
            Some(PathBuf::from("/srv/videos/video1.mp4"))
        );
        assert_eq!(slot_path(&loaded, MediaField::Video2), None);

        store.reset().await.unwrap();
        assert!(store.load().await.is_empty());
        assert_eq!(fs::read(&path).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn playable_path_requires_both_slots_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let first = dir.path().join("video1.mp4");
        let second = dir.path().join("video2.webm");
        fs::write(&first, b"one").await.unwrap();

        let mut config = ConfigMap::new();
        config.insert("video1".into(), json!(first.to_str().unwrap()));
        store.save(&config).await.unwrap();
        assert_eq!(store.playable_path(MediaField::Video1).await, None);

        config.insert("video2".into(), json!(second.to_str().unwrap()));
        store.save(&config).await.unwrap();
        assert_eq!(store.playable_path(MediaField::Video1).await, None);

        fs::write(&second, b"two").await.unwrap();
        assert_eq!(store.playable_path(MediaField::Video1).await, Some(first));
        assert_eq!(
            store.playable_path(MediaField::Video2).await,
            Some(second)
        );
    }
}
