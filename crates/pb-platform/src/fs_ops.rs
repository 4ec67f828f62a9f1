//! Raw filesystem primitives the output layout is built from.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use crate::error::{PlatformError, Result};

/// Create `path` and all missing parent components. "Exists is ok" —
/// mirrors `os.makedirs(..., exist_ok)`-style race-safe mkdir.
pub fn ensure_dir_all(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(PlatformError::CreateDir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Open `path` for writing, failing if it already exists.
///
/// Used for `out`/`err`: a retry must never inherit a prior attempt's
/// output, and the child enforces that itself by opening with `O_EXCL`.
pub fn create_exclusive(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .map_err(|source| PlatformError::CreateExclusive {
            path: path.to_path_buf(),
            source,
        })
}

/// Create a symlink at `dst` pointing at `src`.
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> Result<()> {
    std::os::unix::fs::symlink(src, dst).map_err(|source| PlatformError::Symlink {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })
}

/// Remove `path` if it exists; a no-op otherwise.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(PlatformError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}
