//! MediaService: partial-content delivery of the configured videos.
//!
//! Every request re-reads the file metadata so a freshly uploaded video is
//! never served against a stale length. Bodies are streamed lazily from disk
//! and never buffered.

use crate::services::range_planner::{self, RangeError, RangePlan};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use std::{
    io::{self, SeekFrom},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncRead, AsyncReadExt, AsyncSeekExt},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("video not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{source} (resource is {total} bytes)")]
    Range { source: RangeError, total: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Lazy, single-use byte stream over a slice of a media file.
pub type MediaBody = BoxStream<'static, io::Result<Bytes>>;

/// A planned partial response whose body has not been read yet.
pub struct MediaStream {
    pub plan: RangePlan,
    pub content_type: &'static str,
    pub body: MediaBody,
}

#[derive(Clone, Default)]
pub struct MediaService;

impl MediaService {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` and plan the interval requested by `range_header`.
    ///
    /// The returned stream yields exactly `plan.len()` bytes starting at
    /// `plan.start()` unless the file shrinks underneath it; read failures
    /// are logged and surface as stream errors, which aborts the response.
    pub async fn open(
        &self,
        path: &Path,
        range_header: Option<&str>,
    ) -> Result<MediaStream, MediaError> {
        let meta = match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(MediaError::NotFound(path.to_path_buf())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(MediaError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(MediaError::Io(err)),
        };

        let total = meta.len();
        let plan = range_planner::plan(range_header, total)
            .map_err(|source| MediaError::Range { source, total })?;

        let mut file = File::open(path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                MediaError::NotFound(path.to_path_buf())
            } else {
                MediaError::Io(err)
            }
        })?;
        file.seek(SeekFrom::Start(plan.start())).await?;

        debug!(
            "streaming {} ({})",
            path.display(),
            plan.content_range()
        );

        Ok(MediaStream {
            plan,
            content_type: content_type_for(path),
            body: stream_body(file, plan.len(), path.display().to_string()),
        })
    }
}

/// Stream at most `len` bytes of `reader`, logging a read failure against
/// `source` before it ends the body.
fn stream_body<R>(reader: R, len: u64, source: String) -> MediaBody
where
    R: AsyncRead + Send + 'static,
{
    ReaderStream::new(reader.take(len))
        .inspect_err(move |err| {
            error!("stream error while reading {}: {}", source, err);
        })
        .boxed()
}

/// Content type for a stored video, chosen by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("webm") => "video/webm",
        Some("ogg") => "video/ogg",
        _ => "video/mp4",
    }
}
