use std::path::PathBuf;
use std::time::Duration;

/// Everything the scheduler needs beyond the enumerated items themselves.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Root directory items' `D/N` subdirectories are created under.
    pub destination: PathBuf,
    /// Shell `argv[0]`/exec target, e.g. `/bin/sh`.
    pub shell: PathBuf,
    /// The command template, with `{}` substituted when `stdin` is false.
    pub command: String,
    /// `P`, the maximum number of concurrently active children.
    pub processes: usize,
    /// Extra attempts beyond the first.
    pub retries: u32,
    /// Re-run items whose prior `status` was `0`.
    pub recreate: bool,
    /// Wire the item's bytes to fd 0 instead of `{}`-substituting the
    /// command.
    pub stdin: bool,
    /// Primary bounded-wait duration; shortened to `0.05 *` itself after
    /// the first reap within a collection burst.
    pub wait_timeout: Duration,
    /// Seed for the queue shuffle and predictor refreshes. `None` draws
    /// from OS entropy; tests pin this for reproducibility.
    pub rng_seed: Option<u64>,
}
