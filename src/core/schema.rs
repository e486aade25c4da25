//! Records shared by the runner, reporter and storage sinks.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::{Capabilities, Outcome};

/// Version of the JSON report layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Timing statistics over per-call samples, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingStat {
    pub samples: u32,
    pub mean_ns: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_ns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev_ns: Option<f64>,
    pub min_ns: f64,
    pub max_ns: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_ns: Option<f64>,
}

impl TimingStat {
    /// Create TimingStat from per-call durations in nanoseconds
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return TimingStat {
                samples: 0,
                mean_ns: 0.0,
                median_ns: None,
                stddev_ns: None,
                min_ns: 0.0,
                max_ns: 0.0,
                p95_ns: None,
            };
        }

        let mean_ns = samples.iter().sum::<f64>() / n as f64;
        let min_ns = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_ns = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let variance = samples.iter().map(|x| (x - mean_ns).powi(2)).sum::<f64>() / n as f64;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let median_ns = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        // p95: index = ceil(0.95 * n) - 1, clamped
        let p95_idx = ((0.95 * n as f64).ceil() as usize)
            .saturating_sub(1)
            .min(n - 1);

        TimingStat {
            samples: n as u32,
            mean_ns,
            median_ns: Some(median_ns),
            stddev_ns: Some(variance.sqrt()),
            min_ns,
            max_ns,
            p95_ns: Some(sorted[p95_idx]),
        }
    }

    /// Calls per second implied by the mean; a zero mean is clamped to 1ns.
    pub fn ops_per_second(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        1e9 / self.mean_ns.max(1.0)
    }
}

/// An engine as it took part in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub capabilities: Capabilities,
}

/// Knobs for one suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub warmup_iterations: u32,
    pub measured_iterations: u32,
    /// Wall-clock budget per (engine, fixture) pair; 0 disables it.
    pub per_pair_timeout_millis: u64,
    pub parallel_compile: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            warmup_iterations: 1000,
            measured_iterations: 5000,
            per_pair_timeout_millis: 10_000,
            parallel_compile: false,
        }
    }
}

impl RunConfig {
    pub fn pair_budget(&self) -> Option<Duration> {
        (self.per_pair_timeout_millis > 0).then(|| Duration::from_millis(self.per_pair_timeout_millis))
    }
}

/// One timed `validate` call. Appended to the sample log, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSample {
    pub engine_id: Arc<str>,
    pub schema_id: Arc<str>,
    pub fixture_id: Arc<str>,
    pub duration_nanos: u64,
    pub outcome: Outcome,
}

/// Aggregate over the samples of one (engine, fixture) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub engine_id: String,
    pub schema_id: String,
    pub fixture_id: String,
    pub ops_per_second: f64,
    pub mean_duration_nanos: f64,
    pub sample_count: usize,
    pub correctness_match: bool,
    pub mismatch_count: usize,
    pub truncated: bool,
    pub timing: TimingStat,
}
