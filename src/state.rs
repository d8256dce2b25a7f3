//! Shared request state: one handle per service, all built from `AppConfig`.

use crate::{
    config::AppConfig,
    services::{
        analytics::AnalyticsService, choice_log::ChoiceLog, config_store::ConfigStore,
        media_service::MediaService, upload_service::UploadService,
    },
};
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub config: ConfigStore,
    pub media: MediaService,
    pub uploads: UploadService,
    pub choices: ChoiceLog,
    pub analytics: AnalyticsService,

    /// Directories probed by `/readyz`.
    pub writable_dirs: Vec<(&'static str, PathBuf)>,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let config = ConfigStore::new(&cfg.config_path);
        let choices = ChoiceLog::new(&cfg.data_dir);
        Self {
            media: MediaService::new(),
            uploads: UploadService::new(&cfg.videos_dir, config.clone()),
            analytics: AnalyticsService::new(choices.clone()),
            writable_dirs: vec![
                ("data", cfg.data_dir.clone()),
                ("videos", cfg.videos_dir.clone()),
            ],
            config,
            choices,
        }
    }
}
