//! Store file discovery.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Marker file that holds a project's server aliases
pub const STORE_FILE_NAME: &str = ".mcphub.json";

/// Find the store file starting from the current directory.
pub fn locate() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    locate_from(&cwd)
}

/// Find the store file in `start` or the closest ancestor that has one.
pub fn locate_from(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(STORE_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found store file");
            return Ok(candidate);
        }
    }

    Err(Error::ConfigNotFound {
        file_name: STORE_FILE_NAME,
        start: start.to_path_buf(),
    })
}

/// Conventional store location for a project directory.
pub fn store_path_in(dir: &Path) -> PathBuf {
    dir.join(STORE_FILE_NAME)
}
