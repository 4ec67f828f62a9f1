//! Pipe-backed stdin for line work items.
//!
//! A line never touches disk: its bytes are written into an anonymous pipe
//! and the read end is handed to the child as fd 0. For payloads that fit
//! in a single atomic pipe write (`PIPE_BUF`, 4096 bytes on Linux) the
//! write happens inline before this function returns; larger payloads are
//! written from a detached helper thread so a pipe with a smaller kernel
//! buffer than the line can't deadlock the scheduler.

use std::fs::File;
use std::io::Write;
use std::os::unix::io::FromRawFd;

use tracing::warn;

use crate::error::{PlatformError, Result};

const PIPE_BUF: usize = 4096;

/// Create a pipe, write `bytes` into it, and return the read end.
pub fn pipe_with_bytes(bytes: &[u8]) -> Result<File> {
    let mut fds = [0i32; 2];
    // SAFETY: `fds` is a valid 2-element buffer for pipe2 to fill in;
    // O_CLOEXEC keeps the fds from leaking into siblings spawned
    // concurrently by other tasks before this pipe's ends are consumed.
    let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if ret != 0 {
        return Err(PlatformError::Pipe(std::io::Error::last_os_error()));
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    // SAFETY: write_fd was just returned by pipe2 and is owned here.
    let mut write_end = unsafe { File::from_raw_fd(write_fd) };

    if bytes.len() <= PIPE_BUF {
        if let Err(e) = write_end.write_all(bytes) {
            warn!(error = %e, "failed to write line payload to pipe");
        }
        drop(write_end);
    } else {
        let owned = bytes.to_vec();
        std::thread::spawn(move || {
            if let Err(e) = write_end.write_all(&owned) {
                warn!(error = %e, "failed to write oversized line payload to pipe");
            }
        });
    }

    // SAFETY: read_fd was just returned by pipe2 and is owned here.
    Ok(unsafe { File::from_raw_fd(read_fd) })
}
