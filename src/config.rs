use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub config_path: PathBuf,
    pub public_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Two-video preference poll server")]
pub struct Args {
    /// Host to bind to (overrides MEDIA_PREF_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEDIA_PREF_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the daily selection logs (overrides MEDIA_PREF_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory where uploaded videos are stored (overrides MEDIA_PREF_VIDEOS_DIR)
    #[arg(long)]
    pub videos_dir: Option<PathBuf>,

    /// JSON config file (overrides MEDIA_PREF_CONFIG_PATH)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Directory of static pages (overrides MEDIA_PREF_PUBLIC_DIR)
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// Largest accepted admin upload body (overrides MEDIA_PREF_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse())
    }

    /// Merge parsed CLI args over environment values and defaults.
    pub fn resolve(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("MEDIA_PREF_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_number("MEDIA_PREF_PORT", 3000u16)?;
        let env_max_upload = env_number("MEDIA_PREF_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let env_data = env_path("MEDIA_PREF_DATA_DIR", "./data");
        let env_videos = env_path("MEDIA_PREF_VIDEOS_DIR", "./videos");
        let env_config = env_path("MEDIA_PREF_CONFIG_PATH", "./config.json");
        let env_public = env_path("MEDIA_PREF_PUBLIC_DIR", "./public");

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            data_dir: args.data_dir.unwrap_or(env_data),
            videos_dir: args.videos_dir.unwrap_or(env_videos),
            config_path: args.config_path.unwrap_or(env_config),
            public_dir: args.public_dir.unwrap_or(env_public),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var_os(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}
