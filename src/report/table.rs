//! Text and Markdown rendering of a `Report`.

use super::{Report, ReportRow};

const TEXT_HEADERS: [&str; 7] = ["#", "engine", "ops/sec", "mean", "p95", "samples", "status"];

/// Human-readable throughput, e.g. `1.23M`, `45.6K`, `789`.
pub fn format_ops(ops: f64) -> String {
    if ops >= 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops >= 1_000.0 {
        format!("{:.1}K", ops / 1_000.0)
    } else {
        format!("{:.0}", ops)
    }
}

/// Human-readable duration from nanoseconds.
pub fn format_duration(nanos: f64) -> String {
    if nanos >= 1e9 {
        format!("{:.2}s", nanos / 1e9)
    } else if nanos >= 1e6 {
        format!("{:.2}ms", nanos / 1e6)
    } else if nanos >= 1e3 {
        format!("{:.2}µs", nanos / 1e3)
    } else {
        format!("{:.0}ns", nanos)
    }
}

fn status_text(row: &ReportRow) -> String {
    let mut notes = Vec::new();
    if !row.correctness_match {
        if row.sample_count == 0 {
            notes.push("MISMATCH (no samples)".to_string());
        } else {
            notes.push(format!("MISMATCH ({}/{})", row.mismatch_count, row.sample_count));
        }
    }
    if row.truncated {
        notes.push("TRUNCATED".to_string());
    }
    if notes.is_empty() {
        "ok".to_string()
    } else {
        notes.join(", ")
    }
}

fn text_cells(row: &ReportRow) -> [String; 7] {
    [
        row.rank.to_string(),
        row.engine.clone(),
        format_ops(row.ops_per_second),
        format_duration(row.mean_duration_nanos),
        row.p95_duration_nanos
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string()),
        row.sample_count.to_string(),
        status_text(row),
    ]
}

/// Aligned console table, one block per fixture.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Suite: {} ({})\n",
        report.metadata.suite, report.metadata.generated_at
    ));
    out.push_str(&format!("Environment: {}\n", report.metadata.environment.summary()));
    out.push_str(&format!(
        "Warmup: {}, measured: {}, budget per pair: {}\n",
        report.metadata.config.warmup_iterations,
        report.metadata.config.measured_iterations,
        match report.metadata.config.per_pair_timeout_millis {
            0 => "none".to_string(),
            ms => format!("{ms}ms"),
        }
    ));

    for group in &report.groups {
        out.push_str(&format!(
            "\n{} / {}  (expect {})\n",
            group.schema,
            group.fixture,
            group.expected.describe()
        ));
        if group.rows.is_empty() {
            out.push_str("  no results\n");
            continue;
        }

        let cells: Vec<[String; 7]> = group.rows.iter().map(text_cells).collect();
        let mut widths = TEXT_HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cols: &[String]| {
            let padded: Vec<String> = cols
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (c, &w))| {
                    // numbers right-aligned, names and status left-aligned
                    if i == 1 || i == 6 {
                        format!("{c:<w$}")
                    } else {
                        format!("{c:>w$}")
                    }
                })
                .collect();
            format!("  {}\n", padded.join("  ").trim_end())
        };
        out.push_str(&line(TEXT_HEADERS.map(String::from).as_slice()));
        for row in &cells {
            out.push_str(&line(row.as_slice()));
        }
    }

    if !report.excluded.is_empty() {
        out.push_str("\nExcluded engines:\n");
        for e in &report.excluded {
            out.push_str(&format!("  {} on {}: {}\n", e.engine, e.schema, e.reason));
        }
    }
    if !report.timed_out.is_empty() {
        out.push_str("\nTruncated pairs:\n");
        for t in &report.timed_out {
            out.push_str(&format!(
                "  {} on {}/{}: {}/{} samples, {}\n",
                t.engine, t.schema, t.fixture, t.completed, t.requested, t.reason
            ));
        }
    }

    out.push_str(&format!(
        "\n{} results, {} mismatches, {} excluded, {} truncated\n",
        report.summary.results,
        report.summary.mismatches,
        report.summary.excluded,
        report.summary.truncated
    ));
    if report.summary.abandoned_workers > 0 {
        out.push_str(&format!(
            "{} hung worker(s) abandoned and still running\n",
            report.summary.abandoned_workers
        ));
    }
    out
}

/// Render the report as Markdown for PR comments.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();

    let status_emoji = if report.summary.exit_code == 0 { "✅" } else { "⚠️" };
    out.push_str(&format!(
        "## {} validator-bench: {}\n\n",
        status_emoji, report.metadata.suite
    ));

    out.push_str(&format!(
        "| | |\n|---|---|\n\
         | **Generated** | {} |\n\
         | **Environment** | {} |\n\
         | **Warmup / measured** | {} / {} |\n\n",
        report.metadata.generated_at,
        report.metadata.environment.summary(),
        report.metadata.config.warmup_iterations,
        report.metadata.config.measured_iterations,
    ));

    out.push_str("### Summary\n\n");
    out.push_str(&format!(
        "| Metric | Count |\n|--------|-------|\n\
         | Fixtures | {} |\n\
         | Results | {} |\n\
         | Mismatches | {} |\n\
         | Excluded | {} |\n\
         | Truncated | {} |\n\
         | Abandoned workers | {} |\n\n",
        report.summary.fixtures,
        report.summary.results,
        report.summary.mismatches,
        report.summary.excluded,
        report.summary.truncated,
        report.summary.abandoned_workers
    ));

    for group in &report.groups {
        out.push_str(&format!(
            "### `{}` / `{}` (expect {})\n\n",
            group.schema,
            group.fixture,
            group.expected.describe()
        ));
        out.push_str("| # | Engine | ops/sec | Mean | p95 | Samples | Status |\n");
        out.push_str("|---|--------|---------|------|-----|---------|--------|\n");
        for row in &group.rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} {} |\n",
                row.rank,
                row.engine,
                format_ops(row.ops_per_second),
                format_duration(row.mean_duration_nanos),
                row.p95_duration_nanos
                    .map(format_duration)
                    .unwrap_or_else(|| "-".to_string()),
                row.sample_count,
                row.status.emoji(),
                row.status.label()
            ));
        }
        out.push('\n');
    }

    if !report.excluded.is_empty() {
        out.push_str("### Excluded engines\n\n| Engine | Schema | Reason |\n|--------|--------|--------|\n");
        for e in &report.excluded {
            out.push_str(&format!("| {} | {} | {} |\n", e.engine, e.schema, e.reason));
        }
        out.push('\n');
    }
    if !report.timed_out.is_empty() {
        out.push_str(
            "### Truncated pairs\n\n| Engine | Fixture | Samples | Reason |\n|--------|---------|---------|--------|\n",
        );
        for t in &report.timed_out {
            out.push_str(&format!(
                "| {} | {}/{} | {}/{} | {} |\n",
                t.engine, t.schema, t.fixture, t.completed, t.requested, t.reason
            ));
        }
        out.push('\n');
    }

    out.push_str("---\n");
    out.push_str("✅ = matches expectation | ❌ = correctness mismatch | ⏱️ = truncated by budget\n");
    out
}
