//! The scheduler (C5): fill/predict/collect, repeated until the queue and
//! active map are both empty.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use pb_core::WorkItem;
use pb_layout::{Decision, ItemLayout};
use pb_platform::{ChildStdin, WaitOutcome};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::host::HostCallbacks;
use crate::quote::shell_quote;
use crate::work_in_progress::WorkInProgress;

/// Shorten the wait between collection polls to this fraction of
/// `wait_timeout` once at least one completion has been observed in the
/// current burst, so the scheduler returns to refilling quickly.
const BURST_WAIT_FRACTION: f64 = 0.05;

/// Re-predict no more often than this.
const PREDICTION_INTERVAL: Duration = Duration::from_secs(2);

pub struct Scheduler<H: HostCallbacks> {
    config: SchedulerConfig,
    queue: VecDeque<WorkItem>,
    active: HashMap<u32, WorkInProgress>,
    durations: VecDeque<f64>,
    failure_count: HashMap<String, u32>,
    last_prediction: Option<Instant>,
    rng: StdRng,
    host: H,
}

impl<H: HostCallbacks> Scheduler<H> {
    /// Reconcile every enumerated item against its prior `status` (if
    /// any), then shuffle the resulting queue. Items that are already
    /// done, or whose retry budget is already exhausted, fire one
    /// `progress` tick here and never enter the queue.
    pub fn new(items: Vec<WorkItem>, config: SchedulerConfig, mut host: H) -> Result<Self> {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut queue = Vec::with_capacity(items.len());
        let mut failure_count = HashMap::new();

        for item in items {
            let layout = ItemLayout::new(&config.destination, item.name());
            match layout.reconcile(config.retries, config.recreate)? {
                Decision::Enqueue { seed_failures } => {
                    failure_count.insert(item.name().to_string(), seed_failures);
                    queue.push(item);
                }
                Decision::SkipDone | Decision::SkipFailedFinal => {
                    host.progress();
                }
            }
        }

        queue.shuffle(&mut rng);

        Ok(Scheduler {
            config,
            queue: queue.into(),
            active: HashMap::new(),
            durations: VecDeque::new(),
            failure_count,
            last_prediction: None,
            rng,
            host,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Run fill/predict/collect until the queue and active map are both
    /// empty.
    pub fn clear_queue(&mut self) -> Result<()> {
        while !self.queue.is_empty() || !self.active.is_empty() {
            self.fill_work_in_progress()?;
            self.update_predicted_timing();
            self.collect_completed_work()?;
        }
        Ok(())
    }

    fn fill_work_in_progress(&mut self) -> Result<()> {
        while self.active.len() < self.config.processes {
            let Some(item) = self.queue.pop_front() else {
                break;
            };

            if !item.exists() {
                debug!(name = item.name(), "source vanished before scheduling, skipping");
                self.host.progress();
                continue;
            }

            let layout = ItemLayout::new(&self.config.destination, item.name());
            layout.ensure_dir()?;
            layout.clean()?;

            item.materialize_in_file(&layout.in_path())?;

            let out = pb_platform::create_exclusive(&layout.out_path())?;
            let err = pb_platform::create_exclusive(&layout.err_path())?;

            let stdin = if self.config.stdin {
                ChildStdin::From(item.open_input_fd()?)
            } else {
                ChildStdin::Null
            };

            let command = if self.config.stdin {
                self.config.command.clone()
            } else {
                let argument = item.as_argument().map_err(|source| SchedulerError::Argument {
                    name: item.name().to_string(),
                    source,
                })?;
                self.config.command.replace("{}", &shell_quote(&argument))
            };

            let child = pb_platform::spawn_shell(&self.config.shell, &command, stdin, out, err)?;
            let pid = child.id();
            info!(name = item.name(), pid, "spawned");

            self.active.insert(
                pid,
                WorkInProgress {
                    child,
                    work_item: item,
                    started: Instant::now(),
                },
            );
        }
        Ok(())
    }

    fn update_predicted_timing(&mut self) {
        if self.active.is_empty() {
            return;
        }
        if let Some(last) = self.last_prediction {
            if last.elapsed() < PREDICTION_INTERVAL {
                return;
            }
        }

        let historical: Vec<f64> = self.durations.iter().copied().collect();
        let in_flight_ages: Vec<f64> = self
            .active
            .values()
            .map(|wip| wip.age().as_secs_f64().max(f64::MIN_POSITIVE))
            .collect();
        let remaining = self.queue.len();
        let seed: u64 = self.rng.gen();

        let prediction = pb_predict::predict_timing(&historical, &in_flight_ages, remaining, seed);
        debug!(mean = prediction.mean(), remaining, "refreshed ETA");
        self.host.predicted(&prediction);
        self.last_prediction = Some(Instant::now());
    }

    fn collect_completed_work(&mut self) -> Result<()> {
        let mut timeout = self.config.wait_timeout;
        loop {
            match pb_platform::wait_any(timeout)? {
                WaitOutcome::Reaped { pid, raw_status } => {
                    self.handle_completion(pid as u32, raw_status)?;
                    timeout = self.config.wait_timeout.mul_f64(BURST_WAIT_FRACTION);
                }
                WaitOutcome::Timeout | WaitOutcome::NoChildren => break,
            }
        }
        Ok(())
    }

    fn handle_completion(&mut self, pid: u32, raw_status: i32) -> Result<()> {
        let Some(wip) = self.active.remove(&pid) else {
            // Not one of ours (e.g. a grandchild reaped by accident); ignore.
            return Ok(());
        };

        let duration = wip.age().as_secs_f64();
        self.durations.push_back(duration);

        let exit_code = pb_platform::exit_code_from_raw(raw_status);
        let name = wip.work_item.name().to_string();
        let layout = ItemLayout::new(&self.config.destination, &name);

        std::fs::write(layout.status_path(), format!("{exit_code}\n")).map_err(|source| {
            SchedulerError::WriteStatus {
                path: layout.status_path(),
                source,
            }
        })?;

        // Failure is judged on the raw status, not `exit_code`: a child
        // killed by a signal whose number happens to leave `raw >> 8 == 0`
        // must still count as a failure, even though `status` records the
        // shifted value unconditionally.
        if raw_status != 0 {
            let count = self.failure_count.entry(name.clone()).or_insert(0);
            if *count < self.config.retries {
                *count += 1;
                warn!(name, exit_code, raw_status, attempt = *count, "retrying");
                self.queue.push_back(wip.work_item);
                return Ok(());
            }
            warn!(name, exit_code, raw_status, "final failure, retry budget exhausted");
        } else {
            debug!(name, "succeeded");
        }

        self.host.progress();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use std::path::PathBuf;

    fn config(destination: PathBuf, processes: usize, retries: u32) -> SchedulerConfig {
        SchedulerConfig {
            destination,
            shell: PathBuf::from("/bin/sh"),
            command: "cat".to_string(),
            processes,
            retries,
            recreate: false,
            stdin: true,
            wait_timeout: Duration::from_millis(200),
            rng_seed: Some(1),
        }
    }

    fn file_items(dir: &std::path::Path, contents: &[(&str, &str)]) -> Vec<WorkItem> {
        contents
            .iter()
            .map(|(name, body)| {
                let path = dir.join(name);
                std::fs::write(&path, body).unwrap();
                WorkItem::File {
                    name: name.to_string(),
                    path,
                }
            })
            .collect()
    }

    #[test]
    fn test_ten_file_cat_scenario() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let items: Vec<(String, String)> = (0..10).map(|i| (format!("{i}.txt"), format!("hello {i}"))).collect();
        let refs: Vec<(&str, &str)> = items.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
        let work = file_items(src.path(), &refs);

        let mut cfg = config(dst.path().to_path_buf(), 4, 0);
        cfg.command = "cat".to_string();
        let host = RecordingHost::default();
        let mut scheduler = Scheduler::new(work, cfg, host).unwrap();
        scheduler.clear_queue().unwrap();

        assert_eq!(scheduler.host().progress_calls, 10);
        for i in 0..10 {
            let dir = dst.path().join(format!("{i}.txt"));
            assert_eq!(std::fs::read_to_string(dir.join("out")).unwrap(), format!("hello {i}"));
            assert_eq!(std::fs::read_to_string(dir.join("err")).unwrap(), "");
            assert_eq!(std::fs::read_to_string(dir.join("status")).unwrap().trim(), "0");
            assert!(std::fs::symlink_metadata(dir.join("in")).unwrap().file_type().is_symlink());
        }
    }

    #[test]
    fn test_stderr_redirection_scenario() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let work = file_items(src.path(), &[("0.txt", "hello 0")]);

        let mut cfg = config(dst.path().to_path_buf(), 2, 0);
        cfg.command = "cat >&2".to_string();
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        let dir = dst.path().join("0.txt");
        assert_eq!(std::fs::read_to_string(dir.join("out")).unwrap(), "");
        assert_eq!(std::fs::read_to_string(dir.join("err")).unwrap(), "hello 0");
    }

    #[test]
    fn test_placeholder_substitution_scenario() {
        let dst = tempfile::tempdir().unwrap();
        let items = vec![WorkItem::Line {
            name: "item0".to_string(),
            line: "hello 0\n".to_string(),
        }];

        let mut cfg = config(dst.path().to_path_buf(), 1, 0);
        cfg.stdin = false;
        cfg.command = "echo {}".to_string();
        let mut scheduler = Scheduler::new(items, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        let dir = dst.path().join("item0");
        assert_eq!(std::fs::read_to_string(dir.join("out")).unwrap().trim(), "hello 0");
        assert_eq!(std::fs::read_to_string(dir.join("in")).unwrap(), "hello 0\n");
    }

    #[test]
    fn test_retry_until_success_across_runs() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let work = file_items(src.path(), &[("0.txt", "x")]);

        let mut cfg = config(dst.path().to_path_buf(), 1, 1);
        cfg.command = "false".to_string();
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();
        let dir = dst.path().join("0.txt");
        assert_eq!(std::fs::read_to_string(dir.join("status")).unwrap().trim(), "1");

        let work2 = vec![WorkItem::File {
            name: "0.txt".to_string(),
            path: src.path().join("0.txt"),
        }];
        let mut cfg2 = config(dst.path().to_path_buf(), 1, 1);
        cfg2.command = "true".to_string();
        let mut scheduler2 = Scheduler::new(work2, cfg2, RecordingHost::default()).unwrap();
        scheduler2.clear_queue().unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("status")).unwrap().trim(), "0");
    }

    #[test]
    fn test_in_process_retry_consumes_whole_budget() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let counter = src.path().join("counter");
        std::fs::write(&counter, "0").unwrap();
        let work = file_items(src.path(), &[("0.txt", "x")]);

        let mut cfg = config(dst.path().to_path_buf(), 1, 2);
        cfg.command = format!(
            "n=$(cat {0}); echo $((n+1)) > {0}; exit 1",
            counter.display()
        );
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        assert_eq!(std::fs::read_to_string(&counter).unwrap().trim(), "3");
        let dir = dst.path().join("0.txt");
        assert_eq!(std::fs::read_to_string(dir.join("status")).unwrap().trim(), "1");
    }

    #[test]
    fn test_signal_death_retries_despite_zero_shifted_exit_code() {
        // `kill -9 $$` terminates the shell by signal: `raw_status != 0`
        // but `raw_status >> 8 == 0`, since the high byte only carries a
        // normal exit code. The retry decision must key on the raw status,
        // not on the value written to `status`, or this looks like success
        // on the first attempt.
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let counter = src.path().join("counter");
        std::fs::write(&counter, "0").unwrap();
        let work = file_items(src.path(), &[("0.txt", "x")]);

        let mut cfg = config(dst.path().to_path_buf(), 1, 2);
        cfg.command = format!(
            "n=$(cat {0}); echo $((n+1)) > {0}; kill -9 $$",
            counter.display()
        );
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        assert_eq!(std::fs::read_to_string(&counter).unwrap().trim(), "3");
        let dir = dst.path().join("0.txt");
        assert_eq!(std::fs::read_to_string(dir.join("status")).unwrap().trim(), "0");
        assert_eq!(scheduler.host().progress_calls, 1);
    }

    #[test]
    fn test_disappearing_source_is_skipped_with_progress() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let gone_path = src.path().join("gone.txt");
        std::fs::write(&gone_path, "bye").unwrap();
        let work = file_items(src.path(), &[("stays.txt", "hi")]);
        let mut work = work;
        work.push(WorkItem::File {
            name: "gone.txt".to_string(),
            path: gone_path.clone(),
        });
        std::fs::remove_file(&gone_path).unwrap();

        let mut cfg = config(dst.path().to_path_buf(), 2, 0);
        cfg.command = "cat".to_string();
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        assert_eq!(scheduler.host().progress_calls, 2);
        assert!(!dst.path().join("gone.txt").exists());
        assert!(dst.path().join("stays.txt").join("status").exists());
    }

    #[test]
    fn test_shell_selection_changes_argv0() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let work = file_items(src.path(), &[("0.txt", "x")]);

        let mut cfg = config(dst.path().to_path_buf(), 1, 0);
        cfg.command = "echo $0".to_string();
        cfg.shell = PathBuf::from("/bin/sh");
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        let dir = dst.path().join("0.txt");
        assert_eq!(std::fs::read_to_string(dir.join("out")).unwrap().trim(), "sh");
    }

    #[test]
    fn test_empty_source_drains_immediately_with_no_progress() {
        let dst = tempfile::tempdir().unwrap();
        let cfg = config(dst.path().to_path_buf(), 4, 0);
        let mut scheduler = Scheduler::new(Vec::new(), cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();
        assert_eq!(scheduler.host().progress_calls, 0);
    }

    #[test]
    fn test_p_equals_one_runs_sequentially() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let items: Vec<(String, String)> = (0..5).map(|i| (format!("{i}.txt"), format!("hello {i}"))).collect();
        let refs: Vec<(&str, &str)> = items.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
        let work = file_items(src.path(), &refs);

        let mut cfg = config(dst.path().to_path_buf(), 1, 0);
        cfg.command = "cat".to_string();
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();
        assert_eq!(scheduler.host().progress_calls, 5);
    }

    #[test]
    fn test_no_recreate_second_run_does_not_rewrite_status() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let work = file_items(src.path(), &[("0.txt", "x")]);
        let mut cfg = config(dst.path().to_path_buf(), 1, 0);
        cfg.command = "true".to_string();
        let mut scheduler = Scheduler::new(work, cfg, RecordingHost::default()).unwrap();
        scheduler.clear_queue().unwrap();

        let status_path = dst.path().join("0.txt").join("status");
        let before = std::fs::metadata(&status_path).unwrap().modified().unwrap();

        let work2 = vec![WorkItem::File {
            name: "0.txt".to_string(),
            path: src.path().join("0.txt"),
        }];
        let mut cfg2 = config(dst.path().to_path_buf(), 1, 0);
        cfg2.command = "true".to_string();
        let mut scheduler2 = Scheduler::new(work2, cfg2, RecordingHost::default()).unwrap();
        scheduler2.clear_queue().unwrap();

        assert_eq!(scheduler2.host().progress_calls, 1);
        let after = std::fs::metadata(&status_path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }
}
