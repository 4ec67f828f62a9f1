//! Spawning the shell that runs a single work item's command.

use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{PlatformError, Result};

/// What fd 0 should be wired to for a spawned child.
pub enum ChildStdin {
    /// Redirect fd 0 from an already-open file (a source file, or the read
    /// end of a line's pipe).
    From(File),
    /// Close fd 0 entirely (argument-substitution mode).
    Null,
}

/// Spawn `shell -c command`, with `argv[0]` set to `shell`'s basename (as
/// the original tool does), stdout/stderr redirected to `out`/`err`, and
/// stdin wired per `stdin`.
///
/// If exec fails inside the child (bad shell, permission error, ...),
/// `std::process::Command` surfaces that as an `Err` from `spawn()` itself
/// — the child never partially execs — which is why this returns a
/// `Result` rather than always yielding a `Child` whose exit status must be
/// inspected later. See `SPEC_FULL.md` §7 for why this is safer than (and a
/// deliberate, documented redesign of) the original fork-then-execv dance.
pub fn spawn_shell(shell: &Path, command: &str, stdin: ChildStdin, out: File, err: File) -> Result<Child> {
    let argv0 = shell
        .file_name()
        .map(|s| s.to_owned())
        .unwrap_or_else(|| shell.as_os_str().to_owned());

    let mut cmd = Command::new(shell);
    cmd.arg0(argv0);
    cmd.arg("-c").arg(command);
    cmd.stdout(Stdio::from(out));
    cmd.stderr(Stdio::from(err));
    match stdin {
        ChildStdin::From(file) => cmd.stdin(Stdio::from(file)),
        ChildStdin::Null => cmd.stdin(Stdio::null()),
    };

    cmd.spawn().map_err(PlatformError::Spawn)
}
