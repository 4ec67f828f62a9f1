use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum EnumerationError {
    #[error("source path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, EnumerationError>;
