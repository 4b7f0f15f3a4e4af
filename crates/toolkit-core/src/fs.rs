//! Filesystem helpers.

use std::path::Path;

use tokio::fs::{self, DirBuilder};

use crate::Result;

/// Tracing target for filesystem operations.
pub const TRACING_TARGET: &str = "toolkit_core::fs";

/// Permission bits for created directories (`rwxr-xr-x`).
pub const DIR_MODE: u32 = 0o755;

/// Creates `path` and all missing parents unless it already exists.
///
/// An existing entry is left untouched and is not required to be a
/// directory: a regular file at `path` is reported as a warning, not an
/// error.
///
/// # Errors
///
/// Returns an I/O error if the existence check or the creation fails.
pub async fn create_dir_if_missing(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if fs::try_exists(path).await? {
        if !fs::metadata(path).await?.is_dir() {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                "path exists but is not a directory"
            );
        }
        return Ok(());
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        path = %path.display(),
        "created directory"
    );

    Ok(())
}
