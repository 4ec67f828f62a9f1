use std::path::PathBuf;

/// Failures from the platform shim (C1).
///
/// These are always fatal per the parent-I/O-failure branch of the error
/// taxonomy: none of them are recoverable by retrying the same item, so
/// callers should propagate rather than reschedule.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create exclusive file {path}: {source}")]
    CreateExclusive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to symlink {dst} -> {src}: {source}")]
    Symlink {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create pipe: {0}")]
    Pipe(#[source] std::io::Error),

    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("wait() failed: {0}")]
    Wait(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
