use std::path::PathBuf;

/// Fatal scheduler failures — parent-side I/O failures that are never
/// part of an item's own recoverable outcome. Anything reaching this type
/// propagates out of [`crate::Scheduler::clear_queue`] and aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Platform(#[from] pb_platform::PlatformError),

    #[error(transparent)]
    Layout(#[from] pb_layout::LayoutError),

    #[error("failed to write status file {path}: {source}")]
    WriteStatus {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build argument for item {name}: {source}")]
    Argument {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
