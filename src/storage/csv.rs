//! CSV export of benchmark results.

use std::io::Write;
use std::path::Path;

use crate::BenchError;
use crate::core::BenchmarkResult;

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "engine",
    "schema",
    "fixture",
    "ops_per_second",
    "mean_ns",
    "median_ns",
    "stddev_ns",
    "min_ns",
    "max_ns",
    "p95_ns",
    "samples",
    "correctness_match",
    "mismatches",
    "truncated",
];

/// CSV exporter for benchmark results.
///
/// One flat row per (engine, fixture) pair with a fixed column order, so
/// runs can be diffed or loaded into a spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export results to a CSV file.
    ///
    /// # Errors
    /// Returns an error if file operations or CSV writing fails.
    pub fn export(&self, results: &[BenchmarkResult], output: &Path) -> Result<(), BenchError> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BenchError::Message(format!("failed to create directory: {e}")))?;
            }
        }

        let file = std::fs::File::create(output)
            .map_err(|e| BenchError::Message(format!("failed to create file: {e}")))?;

        self.export_to_writer(results, file)
    }

    /// Export results to any writer implementing Write.
    pub fn export_to_writer<W: Write>(
        &self,
        results: &[BenchmarkResult],
        writer: W,
    ) -> Result<(), BenchError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| BenchError::Message(format!("failed to write CSV headers: {e}")))?;

        for result in results {
            csv_writer
                .write_record(self.result_to_row(result))
                .map_err(|e| BenchError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| BenchError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }

    fn result_to_row(&self, result: &BenchmarkResult) -> Vec<String> {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.1}")).unwrap_or_default();
        let t = &result.timing;
        vec![
            result.engine_id.clone(),
            result.schema_id.clone(),
            result.fixture_id.clone(),
            format!("{:.1}", result.ops_per_second),
            format!("{:.1}", result.mean_duration_nanos),
            opt(t.median_ns),
            opt(t.stddev_ns),
            format!("{:.1}", t.min_ns),
            format!("{:.1}", t.max_ns),
            opt(t.p95_ns),
            result.sample_count.to_string(),
            result.correctness_match.to_string(),
            result.mismatch_count.to_string(),
            result.truncated.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimingStat;

    fn sample_result(engine: &str, ok: bool) -> BenchmarkResult {
        let timing = TimingStat::from_samples(&[100.0, 200.0]);
        BenchmarkResult {
            engine_id: engine.to_string(),
            schema_id: "person".to_string(),
            fixture_id: "valid".to_string(),
            ops_per_second: timing.ops_per_second(),
            mean_duration_nanos: timing.mean_ns,
            sample_count: 2,
            correctness_match: ok,
            mismatch_count: if ok { 0 } else { 2 },
            truncated: false,
            timing,
        }
    }

    #[test]
    fn test_csv_headers_and_rows() {
        let mut buf = Vec::new();
        CsvExporter::new()
            .export_to_writer(&[sample_result("boon", true), sample_result("validator", false)], &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert!(lines[1].starts_with("boon,person,valid,6666666.7,150.0,"));
        assert!(lines[2].ends_with(",2,false,2,false"));
    }

    #[test]
    fn test_export_to_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/results.csv");
        CsvExporter::new().export(&[sample_result("a", true)], &path).unwrap();
        assert!(path.exists());
    }
}
