//! The scheduler (C5) and host interface (C7): fills up to `P` concurrent
//! children from a shuffled queue, periodically refreshes a runtime
//! forecast, and collects completions, retrying transient failures up to
//! a configured budget.

mod config;
mod error;
mod host;
mod quote;
mod scheduler;
mod work_in_progress;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulerError};
pub use host::{HostCallbacks, RecordingHost};
pub use scheduler::Scheduler;
pub use work_in_progress::WorkInProgress;
