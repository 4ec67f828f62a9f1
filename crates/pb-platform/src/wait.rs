//! Bounded wait-for-any-child.

use std::time::{Duration, Instant};

use crate::error::{PlatformError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of a bounded [`wait_any`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A child was reaped. `raw_status` is the raw status word from
    /// `waitpid` — callers compute `exit_code = raw_status >> 8` per the
    /// platform's exit-code packing convention.
    Reaped { pid: i32, raw_status: i32 },
    /// No child exited before `timeout` elapsed.
    Timeout,
    /// There were no children to wait for at all (`ECHILD`).
    NoChildren,
}

/// Wait for at most one child to exit, or until `timeout` elapses.
///
/// Implemented as a `waitpid(-1, WNOHANG)` poll loop (one of the strategies
/// the platform shim's design notes call out) rather than a blocking
/// `waitpid`, so the scheduler can still refresh the ETA predictor while no
/// child has exited. A completion observed in the same poll that would
/// otherwise have timed out is always returned as `Reaped` — the deadline
/// is only checked *after* a non-blocking poll comes back empty, so a
/// finishing child is never silently dropped.
pub fn wait_any(timeout: Duration) -> Result<WaitOutcome> {
    let deadline = Instant::now() + timeout;
    loop {
        let mut status: i32 = 0;
        // SAFETY: `status` is a valid out-parameter; pid -1 + WNOHANG means
        // "reap any child without blocking if none has exited".
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        if pid > 0 {
            return Ok(WaitOutcome::Reaped {
                pid,
                raw_status: status,
            });
        }
        if pid == 0 {
            if Instant::now() >= deadline {
                return Ok(WaitOutcome::Timeout);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
            continue;
        }
        // pid < 0
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ECHILD) {
            return Ok(WaitOutcome::NoChildren);
        }
        if err.kind() == std::io::ErrorKind::Interrupted {
            continue;
        }
        return Err(PlatformError::Wait(err));
    }
}

/// Extract the platform's `exit_code` from a raw `waitpid` status.
///
/// Kept as `raw >> 8` unconditionally, including when the low byte
/// indicates termination by signal, rather than special-casing signal
/// deaths.
pub fn exit_code_from_raw(raw_status: i32) -> i32 {
    raw_status >> 8
}
