//! Small filesystem helpers shared by the services.

use std::{
    io::{self, ErrorKind},
    path::Path,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, error};
use uuid::Uuid;

/// Write `contents` to `path` through a temp file in the same directory.
///
/// The temp file is synced and renamed over the target, so readers never see
/// a half-written file. The temp file is removed on any failure.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(ErrorKind::InvalidInput, "target path has no parent directory")
    })?;
    fs::create_dir_all(parent).await?;
    let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

    let result: io::Result<()> = async {
        let mut file = File::create(&tmp_path).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}

/// Remove every entry directly inside `dir`.
///
/// All entries are attempted; the first failure is returned after the pass.
/// A missing directory counts as already clear.
pub async fn clear_directory(dir: &Path) -> io::Result<()> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            error!("error reading directory {}: {}", dir.display(), err);
            return Err(err);
        }
    };

    let mut first_error = None;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let removed = match entry.file_type().await {
            Ok(kind) if kind.is_dir() => fs::remove_dir_all(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(err) => Err(err),
        };
        match removed {
            Ok(()) => debug!("removed {}", path.display()),
            Err(err) => {
                error!("error deleting {}: {}", path.display(), err);
                first_error.get_or_insert(err);
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}
