//! Output layout & reconciliation (C4): resolves the four artifact paths
//! for an item's directory and decides, from a prior run's leftovers,
//! whether the item needs to run again.

mod error;

use std::path::{Path, PathBuf};

pub use error::{LayoutError, Result};

/// What to do with an item at startup, derived from its prior `status`
/// file (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Run the item. `seed_failures` primes the scheduler's retry
    /// counter: `1` when a prior non-zero exit is being retried, `0`
    /// otherwise (fresh item, or a done item being recreated).
    Enqueue { seed_failures: u32 },
    /// A prior run already succeeded; emit one progress tick and move on.
    SkipDone,
    /// A prior run failed and the retry budget is exhausted; emit one
    /// progress tick and move on.
    SkipFailedFinal,
}

/// The four paths under `destination/name`, plus the directory itself.
#[derive(Debug, Clone)]
pub struct ItemLayout {
    dir: PathBuf,
}

impl ItemLayout {
    pub fn new(destination: &Path, name: &str) -> Self {
        ItemLayout {
            dir: destination.join(name),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn in_path(&self) -> PathBuf {
        self.dir.join("in")
    }

    pub fn out_path(&self) -> PathBuf {
        self.dir.join("out")
    }

    pub fn err_path(&self) -> PathBuf {
        self.dir.join("err")
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join("status")
    }

    /// Ensure `dir` exists, creating it (and its parent, the destination
    /// root) if this is a fresh item. "Exists is ok".
    pub fn ensure_dir(&self) -> Result<()> {
        pb_platform::ensure_dir_all(&self.dir).map_err(LayoutError::from)
    }

    /// Read any prior `status` file and decide what to do with this item,
    /// per the reconciliation table: absent/unparseable status enqueues
    /// fresh; `0` either skips or re-enqueues under `recreate`; non-zero
    /// either retries (seeding the failure counter) or is a final skip.
    pub fn reconcile(&self, retries: u32, recreate: bool) -> Result<Decision> {
        let status = match std::fs::read_to_string(self.status_path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Decision::Enqueue { seed_failures: 0 });
            }
            Err(source) => {
                return Err(LayoutError::ReadStatus {
                    path: self.status_path(),
                    source,
                });
            }
        };

        let parsed: Option<i32> = status.trim().parse().ok();
        match parsed {
            None => Ok(Decision::Enqueue { seed_failures: 0 }),
            Some(0) => {
                if recreate {
                    Ok(Decision::Enqueue { seed_failures: 0 })
                } else {
                    Ok(Decision::SkipDone)
                }
            }
            Some(_) => {
                if retries > 0 {
                    Ok(Decision::Enqueue { seed_failures: 1 })
                } else {
                    Ok(Decision::SkipFailedFinal)
                }
            }
        }
    }

    /// Remove any subset of `in`/`out`/`err`/`status` that exists, ahead
    /// of a (re)run — invariant: a retry's directory never contains a
    /// prior attempt's artifacts by the time the child execs.
    pub fn clean(&self) -> Result<()> {
        pb_platform::remove_if_exists(&self.in_path())?;
        pb_platform::remove_if_exists(&self.out_path())?;
        pb_platform::remove_if_exists(&self.err_path())?;
        pb_platform::remove_if_exists(&self.status_path())?;
        Ok(())
    }
}
