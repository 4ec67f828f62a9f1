//! `IndicatifHost`: the only shipped [`pb_scheduler::HostCallbacks`]
//! implementation, rendering a progress bar with a trailing ETA.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pb_predict::Prediction;
use pb_scheduler::HostCallbacks;

pub struct IndicatifHost {
    bar: ProgressBar,
}

impl IndicatifHost {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("template is a constant, known-valid string")
                .progress_chars("##-"),
        );
        IndicatifHost { bar }
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl HostCallbacks for IndicatifHost {
    fn progress(&mut self) {
        self.bar.inc(1);
    }

    fn predicted(&mut self, prediction: &Prediction) {
        let eta = Duration::from_secs_f64(prediction.percentile(99.0).max(0.0));
        self.bar.set_message(format!("eta {}", format_duration(eta)));
    }
}

fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m:02}m")
    } else if m > 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{s}s")
    }
}
