//! UploadService: validation and persistence of admin video uploads.
//!
//! Each media slot is judged on its own: an accepted slot is written to disk
//! even when another slot in the same request is rejected. The request as a
//! whole only succeeds, and the config is only saved, when nothing was
//! rejected.

use crate::{
    models::{
        media::MediaField,
        upload::{UploadOutcome, UploadedFile},
    },
    services::{
        config_store::{ConfigError, ConfigStore},
        files::{clear_directory, write_atomic},
    },
};
use serde_json::Value;
use std::{
    collections::HashMap,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Accepted video extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".ogg"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error("No valid files uploaded")]
    NoValidFiles,
    #[error("error saving {field}: {source}")]
    Storage { field: MediaField, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug)]
pub struct UploadService {
    videos_dir: PathBuf,
    config: ConfigStore,
}

impl UploadService {
    pub fn new(videos_dir: impl Into<PathBuf>, config: ConfigStore) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            config,
        }
    }

    /// Storage location for a slot with the given extension.
    pub fn media_path(&self, field: MediaField, extension: &str) -> PathBuf {
        self.videos_dir.join(format!("{}{}", field, extension))
    }

    /// Validate and store every recognised slot present in `files`.
    ///
    /// Slots are processed in `MediaField::ALL` order regardless of how the
    /// form listed them. Unrecognised fields are ignored.
    pub async fn apply(
        &self,
        files: &HashMap<String, UploadedFile>,
    ) -> Result<Vec<(MediaField, UploadOutcome)>, UploadError> {
        let mut config = self.config.load().await;
        let mut outcomes = Vec::new();

        for field in MediaField::ALL {
            let Some(file) = files.get(field.as_str()) else {
                continue;
            };

            match validate_extension(field, &file.filename) {
                Err(reason) => {
                    warn!("rejected upload for {}: {}", field, file.filename);
                    outcomes.push((field, UploadOutcome::Rejected(reason)));
                }
                Ok(extension) => {
                    let path = self.media_path(field, extension);
                    write_atomic(&path, &file.content)
                        .await
                        .map_err(|source| UploadError::Storage { field, source })?;
                    info!("saved {} to {}", field, path.display());
                    config.insert(
                        field.as_str().into(),
                        Value::String(path.to_string_lossy().into_owned()),
                    );
                    outcomes.push((field, UploadOutcome::Accepted(path)));
                }
            }
        }

        let rejections: Vec<String> = outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                UploadOutcome::Rejected(reason) => Some(reason.clone()),
                UploadOutcome::Accepted(_) => None,
            })
            .collect();
        if !rejections.is_empty() {
            return Err(UploadError::Rejected(rejections));
        }
        if outcomes.is_empty() {
            return Err(UploadError::NoValidFiles);
        }

        self.config.save(&config).await?;

        for (field, outcome) in &outcomes {
            if let UploadOutcome::Accepted(path) = outcome {
                self.remove_stale(*field, path).await;
            }
        }

        Ok(outcomes)
    }

    /// Delete every stored video.
    pub async fn clear_media(&self) -> io::Result<()> {
        clear_directory(&self.videos_dir).await?;
        info!("cleared videos in {}", self.videos_dir.display());
        Ok(())
    }

    /// Drop files left by earlier uploads of `field` under another extension.
    async fn remove_stale(&self, field: MediaField, current: &Path) {
        for extension in ALLOWED_EXTENSIONS {
            let candidate = self.media_path(field, extension);
            if candidate == current {
                continue;
            }
            match fs::remove_file(&candidate).await {
                Ok(()) => debug!("removed stale {}", candidate.display()),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => warn!("could not remove stale {}: {}", candidate.display(), err),
            }
        }
    }
}

/// Check `filename` against the extension allow-list.
///
/// Returns the canonical extension on success, or the rejection message.
pub fn validate_extension(field: MediaField, filename: &str) -> Result<&'static str, String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()));

    extension
        .and_then(|ext| ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext))
        .ok_or_else(|| {
            format!(
                "Invalid file type for {}. Allowed types: {}",
                field,
                ALLOWED_EXTENSIONS.join(", ")
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(filename: &str, content: &'static [u8]) -> UploadedFile {
        UploadedFile {
            filename: filename.into(),
            content: Bytes::from_static(content),
        }
    }

    fn service(dir: &Path) -> UploadService {
        UploadService::new(
            dir.join("videos"),
            ConfigStore::new(dir.join("config.json")),
        )
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(validate_extension(MediaField::Video1, "a.MP4"), Ok(".mp4"));
        assert_eq!(validate_extension(MediaField::Video1, "a.b.webm"), Ok(".webm"));
        assert_eq!(validate_extension(MediaField::Video2, "clip.Ogg"), Ok(".ogg"));
        assert_eq!(
            validate_extension(MediaField::Video2, "setup.exe"),
            Err("Invalid file type for video2. Allowed types: .mp4, .webm, .ogg".into())
        );
        assert!(validate_extension(MediaField::Video1, "mp4").is_err());
        assert!(validate_extension(MediaField::Video1, ".mp4").is_err());
    }

    #[tokio::test]
    async fn accepted_uploads_are_stored_and_configured() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let files = HashMap::from([
            ("video1".to_string(), file("A.MP4", b"first")),
            ("video2".to_string(), file("b.webm", b"second")),
            ("other".to_string(), file("c.mp4", b"ignored")),
        ]);

        let outcomes = service.apply(&files).await.unwrap();
        let v1 = service.media_path(MediaField::Video1, ".mp4");
        let v2 = service.media_path(MediaField::Video2, ".webm");
        assert_eq!(
            outcomes,
            vec![
                (MediaField::Video1, UploadOutcome::Accepted(v1.clone())),
                (MediaField::Video2, UploadOutcome::Accepted(v2.clone())),
            ]
        );
        assert_eq!(fs::read(&v1).await.unwrap(), b"first");
        assert_eq!(fs::read(&v2).await.unwrap(), b"second");

        let config = service.config.load().await;
        assert_eq!(config["video1"], Value::String(v1.to_string_lossy().into()));
        assert_eq!(config["video2"], Value::String(v2.to_string_lossy().into()));
        assert!(!config.contains_key("other"));
    }

    #[tokio::test]
    async fn rejection_is_independent_of_field_order() {
        for (bad, good) in [
            (MediaField::Video1, MediaField::Video2),
            (MediaField::Video2, MediaField::Video1),
        ] {
            let dir = tempfile::tempdir().unwrap();
            let service = service(dir.path());
            let files = HashMap::from([
                (bad.as_str().to_string(), file("tool.exe", b"MZ")),
                (good.as_str().to_string(), file("clip.mp4", b"video")),
            ]);

            match service.apply(&files).await {
                Err(UploadError::Rejected(reasons)) => {
                    assert_eq!(reasons.len(), 1);
                    assert!(reasons[0].contains(bad.as_str()));
                }
                other => panic!("expected rejection, got {:?}", other),
            }

            // the valid slot is already on disk, but the config is untouched
            assert!(service.media_path(good, ".mp4").is_file());
            assert!(!service.media_path(bad, ".exe").exists());
            assert!(service.config.load().await.is_empty());
        }
    }

    #[tokio::test]
    async fn all_rejections_are_reported_together() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let files = HashMap::from([
            ("video1".to_string(), file("a.exe", b"1")),
            ("video2".to_string(), file("b.txt", b"2")),
        ]);

        let err = service.apply(&files).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type for video1. Allowed types: .mp4, .webm, .ogg; \
             Invalid file type for video2. Allowed types: .mp4, .webm, .ogg"
        );
    }

    #[tokio::test]
    async fn no_recognised_fields_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let files = HashMap::from([("poster".to_string(), file("p.mp4", b"x"))]);

        assert!(matches!(
            service.apply(&files).await,
            Err(UploadError::NoValidFiles)
        ));
    }

    #[tokio::test]
    async fn repeated_uploads_overwrite_without_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        for content in [b"one".as_slice(), b"two".as_slice()] {
            let files = HashMap::from([(
                "video1".to_string(),
                UploadedFile {
                    filename: "clip.mp4".into(),
                    content: Bytes::copy_from_slice(content),
                },
            )]);
            service.apply(&files).await.unwrap();
        }
        let files = HashMap::from([("video1".to_string(), file("clip.webm", b"three"))]);
        service.apply(&files).await.unwrap();

        let mut entries = fs::read_dir(dir.path().join("videos")).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["video1.webm"]);
        assert_eq!(
            fs::read(service.media_path(MediaField::Video1, ".webm"))
                .await
                .unwrap(),
            b"three"
        );
    }

    #[tokio::test]
    async fn clear_media_removes_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let files = HashMap::from([("video2".to_string(), file("x.ogg", b"ogg"))]);
        service.apply(&files).await.unwrap();

        service.clear_media().await.unwrap();
        assert!(!service.media_path(MediaField::Video2, ".ogg").exists());
    }
}
