//! Comparison report built from one suite run.
//!
//! A `Report` is a pure function of the run's results:
//! - rows grouped per fixture, ranked by throughput
//! - correctness mismatches and truncations annotated on their rows
//! - excluded and timed-out engines listed explicitly
//! - text and Markdown renderers, JSON through serde

pub mod table;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{BenchmarkResult, EngineInfo, EnvironmentInfo, RunConfig, SCHEMA_VERSION};
use crate::fixture::{Expected, Fixture};
use crate::runner::{Exclusion, SuiteRun, Truncation};

pub use table::{format_duration, format_ops, render_markdown, render_text};

/// How a row should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Ok,
    /// At least one outcome disagreed with the fixture's expectation.
    Mismatch,
    /// Fewer samples than requested; the numbers are partial.
    Truncated,
}

impl RowStatus {
    pub fn emoji(&self) -> &'static str {
        match self {
            RowStatus::Ok => "✅",
            RowStatus::Mismatch => "❌",
            RowStatus::Truncated => "⏱️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Ok => "OK",
            RowStatus::Mismatch => "MISMATCH",
            RowStatus::Truncated => "TRUNCATED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub suite: String,
    /// RFC 3339 timestamp of the run
    pub generated_at: String,
    pub environment: EnvironmentInfo,
    pub config: RunConfig,
    pub engines: Vec<EngineInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub rank: usize,
    pub engine: String,
    pub ops_per_second: f64,
    pub mean_duration_nanos: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_duration_nanos: Option<f64>,
    pub sample_count: usize,
    pub correctness_match: bool,
    pub mismatch_count: usize,
    pub truncated: bool,
    pub status: RowStatus,
}

/// All engines' rows for one fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureGroup {
    pub schema: String,
    pub fixture: String,
    pub expected: Expected,
    pub payload_sha256: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub fixtures: usize,
    pub results: usize,
    pub mismatches: usize,
    pub excluded: usize,
    pub truncated: usize,
    /// Hung workers detached during the run
    #[serde(default)]
    pub abandoned_workers: usize,
    /// 0 when every pair ran fully and matched, 1 otherwise
    pub exit_code: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub version: u32,
    pub metadata: ReportMetadata,
    pub groups: Vec<FixtureGroup>,
    #[serde(default)]
    pub excluded: Vec<Exclusion>,
    #[serde(default)]
    pub timed_out: Vec<Truncation>,
    pub summary: ReportSummary,
}

impl Report {
    pub fn build(run: &SuiteRun) -> Self {
        let metadata = ReportMetadata {
            suite: run.suite.clone(),
            generated_at: run.timestamp.clone(),
            environment: run.environment.clone(),
            config: run.config.clone(),
            engines: run.engines.clone(),
        };
        let mut report = Self::from_results(
            metadata,
            &run.fixtures,
            &run.results(),
            &run.exclusions,
            &run.truncations,
        );
        report.summary.abandoned_workers = run.abandoned_workers;
        report
    }

    /// Group and rank `results`; fixtures keep their given order.
    pub fn from_results(
        metadata: ReportMetadata,
        fixtures: &[Arc<Fixture>],
        results: &[BenchmarkResult],
        exclusions: &[Exclusion],
        truncations: &[Truncation],
    ) -> Self {
        let mut groups = Vec::new();
        for fixture in fixtures {
            let mut pair_results: Vec<&BenchmarkResult> = results
                .iter()
                .filter(|r| r.schema_id == fixture.schema.as_str() && r.fixture_id == fixture.id)
                .collect();
            pair_results.sort_by(|a, b| {
                b.ops_per_second
                    .partial_cmp(&a.ops_per_second)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.engine_id.cmp(&b.engine_id))
            });

            let rows = pair_results
                .into_iter()
                .enumerate()
                .map(|(i, r)| ReportRow {
                    rank: i + 1,
                    engine: r.engine_id.clone(),
                    ops_per_second: r.ops_per_second,
                    mean_duration_nanos: r.mean_duration_nanos,
                    p95_duration_nanos: r.timing.p95_ns,
                    sample_count: r.sample_count,
                    correctness_match: r.correctness_match,
                    mismatch_count: r.mismatch_count,
                    truncated: r.truncated,
                    status: if !r.correctness_match {
                        RowStatus::Mismatch
                    } else if r.truncated {
                        RowStatus::Truncated
                    } else {
                        RowStatus::Ok
                    },
                })
                .collect();

            groups.push(FixtureGroup {
                schema: fixture.schema.to_string(),
                fixture: fixture.id.clone(),
                expected: fixture.expected.clone(),
                payload_sha256: fixture.sha256.clone(),
                rows,
            });
        }

        let mismatches = results.iter().filter(|r| !r.correctness_match).count();
        let failed = mismatches > 0 || !exclusions.is_empty() || !truncations.is_empty();
        let summary = ReportSummary {
            fixtures: groups.len(),
            results: results.len(),
            mismatches,
            excluded: exclusions.len(),
            truncated: truncations.len(),
            abandoned_workers: 0,
            exit_code: if failed { 1 } else { 0 },
        };

        Report {
            version: SCHEMA_VERSION,
            metadata,
            groups,
            excluded: exclusions.to_vec(),
            timed_out: truncations.to_vec(),
            summary,
        }
    }

    pub fn has_mismatch(&self) -> bool {
        self.summary.mismatches > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimingStat;
    use serde_json::json;

    pub(crate) fn metadata() -> ReportMetadata {
        ReportMetadata {
            suite: "test".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            environment: EnvironmentInfo::default(),
            config: RunConfig::default(),
            engines: Vec::new(),
        }
    }

    pub(crate) fn result(engine: &str, fixture: &str, ops: f64, ok: bool) -> BenchmarkResult {
        BenchmarkResult {
            engine_id: engine.to_string(),
            schema_id: "person".to_string(),
            fixture_id: fixture.to_string(),
            ops_per_second: ops,
            mean_duration_nanos: 1e9 / ops,
            sample_count: 10,
            correctness_match: ok,
            mismatch_count: if ok { 0 } else { 10 },
            truncated: false,
            timing: TimingStat::from_samples(&[1e9 / ops]),
        }
    }

    pub(crate) fn fixtures() -> Vec<Arc<Fixture>> {
        vec![
            Arc::new(Fixture::new("person".into(), "valid".into(), json!({}), Expected::Valid)),
            Arc::new(Fixture::new(
                "person".into(),
                "underage".into(),
                json!({"age": 17}),
                Expected::invalid(["age"]),
            )),
        ]
    }

    #[test]
    fn test_rows_ranked_by_ops_descending() {
        let results = vec![
            result("slow", "valid", 100.0, true),
            result("fast", "valid", 10_000.0, true),
            result("mid", "valid", 1_000.0, true),
        ];
        let report = Report::from_results(metadata(), &fixtures(), &results, &[], &[]);
        let engines: Vec<_> = report.groups[0].rows.iter().map(|r| r.engine.as_str()).collect();
        assert_eq!(engines, vec!["fast", "mid", "slow"]);
        assert_eq!(report.groups[0].rows[0].rank, 1);
        assert!(report.groups[1].rows.is_empty());
        assert_eq!(report.summary.exit_code, 0);
    }

    #[test]
    fn test_ties_broken_by_engine_id() {
        let results = vec![result("b", "valid", 5.0, true), result("a", "valid", 5.0, true)];
        let report = Report::from_results(metadata(), &fixtures(), &results, &[], &[]);
        assert_eq!(report.groups[0].rows[0].engine, "a");
    }

    #[test]
    fn test_fast_but_wrong_is_flagged() {
        let results = vec![
            result("wrong", "underage", 1e6, false),
            result("right", "underage", 1e3, true),
        ];
        let report = Report::from_results(metadata(), &fixtures(), &results, &[], &[]);
        let top = &report.groups[1].rows[0];
        assert_eq!(top.engine, "wrong");
        assert_eq!(top.status, RowStatus::Mismatch);
        assert!(report.has_mismatch());
        assert_eq!(report.summary.exit_code, 1);
    }

    #[test]
    fn test_exclusions_fail_the_summary() {
        let exclusions = vec![Exclusion {
            engine: "broken".to_string(),
            schema: "person".to_string(),
            reason: "no uri".to_string(),
        }];
        let results = vec![result("ok", "valid", 5.0, true)];
        let report = Report::from_results(metadata(), &fixtures(), &results, &exclusions, &[]);
        assert_eq!(report.summary.excluded, 1);
        assert_eq!(report.summary.exit_code, 1);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let results = vec![result("a", "valid", 5.0, true)];
        let report = Report::from_results(metadata(), &fixtures(), &results, &[], &[]);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert_eq!(value["groups"][0]["rows"][0]["status"], "ok");
        assert_eq!(value["groups"][1]["expected"]["expect"], "invalid");
    }
}
