//! Turn the sample log into per-pair results.

use crate::core::{BenchmarkResult, TimingStat};

use super::suite::SuiteRun;

/// One result per measured (engine, fixture) pair: engines in registration
/// order, fixtures in registration order. Excluded pairs have no result.
pub fn results(run: &SuiteRun) -> Vec<BenchmarkResult> {
    let mut out = Vec::new();
    for engine in &run.engines {
        for fixture in &run.fixtures {
            let schema = fixture.schema.as_str();
            if run.is_excluded(&engine.id, schema) {
                continue;
            }

            let mut durations = Vec::new();
            let mut mismatch_count = 0;
            for sample in run.samples.for_pair(&engine.id, schema, &fixture.id) {
                durations.push(sample.duration_nanos as f64);
                if !fixture.expected.matches(&sample.outcome) {
                    mismatch_count += 1;
                }
            }

            let timing = TimingStat::from_samples(&durations);
            out.push(BenchmarkResult {
                engine_id: engine.id.clone(),
                schema_id: schema.to_string(),
                fixture_id: fixture.id.clone(),
                ops_per_second: timing.ops_per_second(),
                mean_duration_nanos: timing.mean_ns,
                sample_count: durations.len(),
                correctness_match: !durations.is_empty() && mismatch_count == 0,
                mismatch_count,
                truncated: run.truncation(&engine.id, schema, &fixture.id).is_some(),
                timing,
            });
        }
    }
    out
}
