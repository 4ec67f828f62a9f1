//! Platform shim (C1): spawn with redirected stdio, bounded wait-for-any,
//! and the small set of filesystem primitives the output layout needs.
//!
//! Everything here is a thin wrapper over `std`/`libc` — no policy lives in
//! this crate. It exists so the scheduler can be tested against it without
//! caring how a given OS reaps children or creates exclusive files.

mod child;
mod error;
mod fs_ops;
mod pipe;
mod wait;

pub use child::{ChildStdin, spawn_shell};
pub use error::{PlatformError, Result};
pub use fs_ops::{create_exclusive, ensure_dir_all, remove_if_exists, symlink};
pub use pipe::pipe_with_bytes;
pub use wait::{WaitOutcome, exit_code_from_raw, wait_any};
