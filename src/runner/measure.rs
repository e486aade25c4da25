//! Timed execution of one (engine, fixture) pair.
//!
//! The pair runs on its own worker thread while the caller blocks on a
//! completion channel. The worker enforces the budget between calls; the
//! caller enforces it (plus a grace period) against a call that never
//! returns, in which case the worker is cancelled and left behind.

use std::any::Any;
use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::adapter::{CompiledValidator, Outcome};
use crate::fixture::Fixture;

const MIN_GRACE: Duration = Duration::from_millis(250);
/// Upper bound on the sample buffer reserved up front.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// Everything a worker needs; owned so the worker can outlive the caller.
pub(crate) struct PairJob {
    pub engine: Arc<str>,
    pub validator: Arc<dyn CompiledValidator>,
    pub fixture: Arc<Fixture>,
    pub warmup: u32,
    pub measured: u32,
    pub budget: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PairEnd {
    Completed,
    /// The worker saw the deadline pass between two calls.
    Deadline,
    /// A single call outlived the budget and grace period.
    Hung,
    Panicked(String),
}

pub(crate) struct PairMeasurement {
    /// `(duration_nanos, outcome)` per measured call, in call order.
    pub samples: Vec<(u64, Outcome)>,
    pub end: PairEnd,
    pub elapsed: Duration,
}

enum WorkerExit {
    Finished,
    Deadline,
}

pub(crate) fn measure_pair(job: PairJob) -> PairMeasurement {
    let started = Instant::now();
    let samples: Arc<Mutex<Vec<(u64, Outcome)>>> =
        Arc::new(Mutex::new(Vec::with_capacity((job.measured as usize).min(MAX_PREALLOCATED_SAMPLES))));
    let cancel = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel::<Result<WorkerExit, String>>();
    let budget = job.budget;
    let engine = Arc::clone(&job.engine);

    let worker_samples = Arc::clone(&samples);
    let worker_cancel = Arc::clone(&cancel);
    let spawned = thread::Builder::new()
        .name(format!("measure-{engine}"))
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                run_worker(&job, &worker_samples, &worker_cancel)
            }))
            .map_err(panic_message);
            // The coordinator may have given up on us already.
            let _ = done_tx.send(result);
        });

    let handle = match spawned {
        Ok(handle) => handle,
        Err(err) => {
            return PairMeasurement {
                samples: Vec::new(),
                end: PairEnd::Panicked(format!("failed to spawn worker: {err}")),
                elapsed: started.elapsed(),
            };
        }
    };

    let received = match budget {
        Some(budget) => done_rx.recv_timeout(budget + grace(budget)),
        None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };

    let end = match received {
        Ok(Ok(WorkerExit::Finished)) => PairEnd::Completed,
        Ok(Ok(WorkerExit::Deadline)) => PairEnd::Deadline,
        Ok(Err(reason)) => PairEnd::Panicked(reason),
        Err(RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::SeqCst);
            warn!(engine = %engine, "validate call did not return within budget; abandoning worker");
            PairEnd::Hung
        }
        Err(RecvTimeoutError::Disconnected) => {
            PairEnd::Panicked("worker exited without reporting".to_string())
        }
    };

    if end != PairEnd::Hung {
        let _ = handle.join();
    }

    let samples = std::mem::take(&mut *samples.lock().unwrap_or_else(|e| e.into_inner()));
    debug!(engine = %engine, samples = samples.len(), ?end, "pair finished");
    PairMeasurement {
        samples,
        end,
        elapsed: started.elapsed(),
    }
}

fn run_worker(job: &PairJob, samples: &Mutex<Vec<(u64, Outcome)>>, cancel: &AtomicBool) -> WorkerExit {
    let deadline = job.budget.map(|b| Instant::now() + b);
    let stop = || cancel.load(Ordering::Relaxed) || deadline.is_some_and(|d| Instant::now() >= d);
    let payload = &job.fixture.payload;

    for _ in 0..job.warmup {
        if stop() {
            return WorkerExit::Deadline;
        }
        black_box(job.validator.validate(black_box(payload)));
    }

    for _ in 0..job.measured {
        if stop() {
            return WorkerExit::Deadline;
        }
        let start = Instant::now();
        let outcome = black_box(job.validator.validate(black_box(payload)));
        let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        samples
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((nanos, outcome));
    }
    WorkerExit::Finished
}

fn grace(budget: Duration) -> Duration {
    (budget / 10).max(MIN_GRACE)
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "validator panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{EngineAdapter, MockAdapter, MockConfig};
    use crate::fixture::Expected;
    use crate::model::{SchemaCatalog, define_schema};
    use serde_json::json;

    fn job(config: MockConfig, measured: u32, budget: Option<Duration>) -> PairJob {
        let schema = define_schema("s", vec![]).unwrap();
        let mut catalog = SchemaCatalog::new();
        catalog.insert(schema.clone()).unwrap();
        let validator = MockAdapter::new(config).compile(&schema, &catalog).unwrap();
        PairJob {
            engine: Arc::from("mock"),
            validator,
            fixture: Arc::new(Fixture::new("s".into(), "f".into(), json!({}), Expected::Valid)),
            warmup: 2,
            measured,
            budget,
        }
    }

    #[test]
    fn test_completes_all_samples() {
        let m = measure_pair(job(MockConfig::new("mock"), 50, Some(Duration::from_secs(5))));
        assert_eq!(m.end, PairEnd::Completed);
        assert_eq!(m.samples.len(), 50);
        assert!(m.samples.iter().all(|(_, o)| o.valid));
    }

    #[test]
    fn test_deadline_truncates_between_calls() {
        let config = MockConfig::new("slow").with_delay(Duration::from_millis(20));
        let m = measure_pair(job(config, 1000, Some(Duration::from_millis(200))));
        assert_eq!(m.end, PairEnd::Deadline);
        assert!(m.samples.len() < 1000);
    }

    #[test]
    fn test_hung_call_is_abandoned() {
        let config = MockConfig::new("hang").with_delay(Duration::from_secs(30));
        let m = measure_pair(job(config, 10, Some(Duration::from_millis(100))));
        assert_eq!(m.end, PairEnd::Hung);
        assert!(m.samples.is_empty());
        assert!(m.elapsed < Duration::from_secs(10));
    }

    #[test]
    fn test_huge_iteration_count_is_bounded_by_budget() {
        let config = MockConfig::new("slow").with_delay(Duration::from_millis(1));
        let m = measure_pair(job(config, u32::MAX, Some(Duration::from_millis(100))));
        assert_eq!(m.end, PairEnd::Deadline);
        assert!(!m.samples.is_empty());
        assert!(m.samples.len() < MAX_PREALLOCATED_SAMPLES);
    }

    #[test]
    fn test_panic_is_reported() {
        let m = measure_pair(job(MockConfig::new("boom").validate_panics(), 10, None));
        assert_eq!(m.end, PairEnd::Panicked("mock validator panicked".to_string()));
    }
}
