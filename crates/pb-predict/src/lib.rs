//! Runtime predictor (C6): a Monte-Carlo simulation of how long the
//! remaining queue will take to drain, given historical per-task
//! durations and the ages of tasks currently in flight.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp};

const SIMULATIONS: usize = 200;

/// The outcome of [`predict_timing`]: a distribution over total remaining
/// wall-clock seconds, expressed as `S` simulated totals.
#[derive(Debug, Clone)]
pub struct Prediction {
    simulations: Vec<f64>,
}

impl Prediction {
    pub fn simulations(&self) -> &[f64] {
        &self.simulations
    }

    pub fn mean(&self) -> f64 {
        self.simulations.iter().sum::<f64>() / self.simulations.len() as f64
    }

    /// `q`-th percentile (0..=100) of the simulated totals, linearly
    /// interpolated between the two nearest order statistics — the same
    /// convention `numpy.percentile`'s default uses, since the original
    /// predictor was built on `np.percentile`.
    pub fn percentile(&self, q: f64) -> f64 {
        let mut sorted = self.simulations.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("simulated durations are never NaN"));
        let n = sorted.len();
        if n == 1 {
            return sorted[0];
        }
        let rank = (q / 100.0) * (n - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        if lo == hi {
            sorted[lo]
        } else {
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF64(f64);

impl Eq for OrderedF64 {}
impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("simulated durations are never NaN")
    }
}

/// Simulate the remaining queue's completion time.
///
/// * `historical_durations` — completed task runtimes observed so far.
/// * `in_flight_ages` — how long (seconds) each of the currently active
///   tasks has already been running; its length is the scheduler's
///   concurrency `P`.
/// * `remaining_tasks` — how many unstarted tasks are left in the queue.
/// * `seed` — deterministic seed; identical inputs + seed always produce
///   bit-identical simulated totals.
pub fn predict_timing(
    historical_durations: &[f64],
    in_flight_ages: &[f64],
    remaining_tasks: usize,
    seed: u64,
) -> Prediction {
    let mut rng = StdRng::seed_from_u64(seed);
    let parallelism = in_flight_ages.len();

    // Step 1: memoryless prior for each in-flight task's remaining time.
    let current_predictions: Vec<f64> = in_flight_ages
        .iter()
        .map(|&age| draw_exponential(&mut rng, 1.0 / age))
        .collect();

    // Step 2: the pool simulated remaining tasks are drawn from.
    let mut task_times = current_predictions.clone();
    task_times.extend_from_slice(historical_durations);

    if remaining_tasks == 0 {
        // No unstarted tasks: the batch's remaining time is governed
        // entirely by whichever in-flight task finishes last.
        let total = current_predictions
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        return Prediction {
            simulations: vec![total; SIMULATIONS],
        };
    }

    let simulations = (0..SIMULATIONS)
        .map(|_| simulate_once(&mut rng, &task_times, parallelism, remaining_tasks))
        .collect();

    Prediction { simulations }
}

fn simulate_once(rng: &mut StdRng, task_times: &[f64], parallelism: usize, remaining_tasks: usize) -> f64 {
    let runtimes: Vec<f64> = (0..remaining_tasks)
        .map(|_| {
            let rate = task_times[rng.gen_range(0..task_times.len())];
            draw_exponential(rng, 1.0 / rate)
        })
        .collect();

    let seeded = parallelism.min(runtimes.len());
    let mut heap: BinaryHeap<Reverse<OrderedF64>> =
        runtimes[..seeded].iter().map(|&t| Reverse(OrderedF64(t))).collect();

    for &t in &runtimes[seeded..] {
        let Reverse(OrderedF64(clock)) = heap.pop().expect("heap seeded with at least one slot");
        heap.push(Reverse(OrderedF64(clock + t)));
    }

    heap.into_iter()
        .map(|Reverse(OrderedF64(v))| v)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn draw_exponential(rng: &mut StdRng, rate: f64) -> f64 {
    Exp::new(rate)
        .expect("rate is a finite positive runtime estimate")
        .sample(rng)
}
