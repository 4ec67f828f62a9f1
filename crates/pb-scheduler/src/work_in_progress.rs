use std::process::Child;
use std::time::Instant;

use pb_core::WorkItem;

/// Bookkeeping for one active child, keyed by pid in the scheduler's
/// active map.
pub struct WorkInProgress {
    pub child: Child,
    pub work_item: WorkItem,
    pub started: Instant,
}

impl WorkInProgress {
    pub fn age(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}
