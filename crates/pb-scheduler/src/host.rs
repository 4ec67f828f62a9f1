//! Host interface (C7): decouples the scheduler from however the caller
//! wants to render progress.

use pb_predict::Prediction;

/// Callbacks the scheduler invokes as items finish and forecasts refresh.
/// Both hooks must return promptly — any expensive rendering work is the
/// host's own responsibility to buffer or defer.
pub trait HostCallbacks {
    /// Called exactly once per item that reaches a terminal state or is
    /// skipped (pre-existing success, missing source, final failure).
    fn progress(&mut self);

    /// Called when a new ETA forecast is available.
    fn predicted(&mut self, prediction: &Prediction);
}

/// A [`HostCallbacks`] that only counts calls, for scheduler tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub progress_calls: usize,
    pub prediction_calls: usize,
    pub last_prediction_mean: Option<f64>,
}

impl HostCallbacks for RecordingHost {
    fn progress(&mut self) {
        self.progress_calls += 1;
    }

    fn predicted(&mut self, prediction: &Prediction) {
        self.prediction_calls += 1;
        self.last_prediction_mean = Some(prediction.mean());
    }
}
