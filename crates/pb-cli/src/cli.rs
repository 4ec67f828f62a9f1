//! Command-line surface, matching `SPEC_FULL.md` §6 exactly.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "parabatch", version, about = "Run a command once per input, in parallel, with resume and retry")]
pub struct Cli {
    /// Directory of files, or a text file of lines, to process.
    pub source: PathBuf,

    /// Shell command to run once per input.
    pub command: String,

    /// Output directory (default: `source` with trailing slashes
    /// stripped, `-results` appended).
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Shell to exec (default: `$SHELL`, else `bash`, else `sh`).
    #[arg(long)]
    pub shell: Option<PathBuf>,

    /// Re-run items whose prior run already succeeded.
    #[arg(long, overrides_with = "no_recreate")]
    pub recreate: bool,

    /// Inverse of `--recreate` (the default).
    #[arg(long, overrides_with = "recreate")]
    pub no_recreate: bool,

    /// Maximum concurrent children (default: `max(1, cpu_count - 1)`).
    #[arg(long = "processes", short = 'j')]
    pub processes: Option<usize>,

    /// Extra attempts beyond the first, per item (default: 0).
    #[arg(long)]
    pub retries: Option<u32>,

    /// Wire each item's bytes to the child's stdin.
    #[arg(long = "stdin", overrides_with = "no_stdin")]
    pub stdin_flag: bool,

    /// Substitute `{}` in `command` instead of using stdin.
    #[arg(long = "no-stdin", overrides_with = "stdin_flag")]
    pub no_stdin_flag: bool,
}

impl Cli {
    /// `--recreate`/`--no-recreate` collapsed to a single bool; `false`
    /// (the default) unless `--recreate` won the override race.
    pub fn recreate(&self) -> bool {
        self.recreate && !self.no_recreate
    }

    /// `--stdin`/`--no-stdin` collapsed to a tri-state: `None` means
    /// "auto" (use stdin unless `{}` appears in `command`), matching
    /// click's `default=None` in the original tool.
    pub fn stdin(&self) -> Option<bool> {
        if self.stdin_flag && !self.no_stdin_flag {
            Some(true)
        } else if self.no_stdin_flag && !self.stdin_flag {
            Some(false)
        } else {
            None
        }
    }
}
