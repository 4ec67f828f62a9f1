use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("failed to read status file {path}: {source}")]
    ReadStatus {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Platform(#[from] pb_platform::PlatformError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
