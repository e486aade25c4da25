use std::path::PathBuf;

use tracing::info;

use super::config::{SuiteConfig, load_suite_config};
use crate::core::EnvironmentInfo;
use crate::fixture::workload_by_name;
use crate::report::{Report, render_markdown, render_text};
use crate::runner::Suite;
use crate::storage::{CsvExporter, write_json, write_text};
use crate::{BenchError, BenchResult, adapter};

/// Exit status when `--fail-on-mismatch` trips.
pub const MISMATCH_EXIT_CODE: i32 = 2;

/// Command-line overrides for `run`; `None` keeps the config file value.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub engines: Vec<String>,
    pub workloads: Vec<String>,
    pub warmup: Option<u32>,
    pub iterations: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub parallel_compile: bool,
    pub json: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub fail_on_mismatch: bool,
}

impl RunOptions {
    /// The effective config: file (or defaults) with flags applied on top.
    pub fn resolve(&self) -> BenchResult<SuiteConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_suite_config(path)?,
            None => SuiteConfig::default(),
        };
        if !self.engines.is_empty() {
            cfg.engines = Some(self.engines.clone());
        }
        if !self.workloads.is_empty() {
            cfg.workloads = Some(self.workloads.clone());
        }
        if let Some(n) = self.warmup {
            cfg.run.warmup_iterations = n;
        }
        if let Some(n) = self.iterations {
            cfg.run.measured_iterations = n;
        }
        if let Some(ms) = self.timeout_ms {
            cfg.run.per_pair_timeout_millis = ms;
        }
        if self.parallel_compile {
            cfg.run.parallel_compile = true;
        }
        cfg.check()?;
        Ok(cfg)
    }
}

/// Register the selected workloads and engines on a fresh suite.
pub fn build_suite(cfg: &SuiteConfig, environment: EnvironmentInfo) -> BenchResult<Suite> {
    cfg.check()?;
    let workloads = cfg.workload_names();
    let mut suite = Suite::new(workloads.join("+"), cfg.run.clone()).with_environment(environment);

    for name in &workloads {
        let workload = workload_by_name(name)?
            .ok_or_else(|| BenchError::Message(format!("unknown workload '{name}'")))?;
        suite.add_workload(&workload)?;
    }

    for name in cfg.engine_names() {
        let engine = adapter::adapter_by_name(&name)
            .ok_or_else(|| BenchError::Message(format!("unknown engine '{name}'")))?;
        suite.add_adapter(engine)?;
    }
    Ok(suite)
}

/// Run the suite, print the text report and write requested outputs.
/// Returns the process exit code.
pub fn run(opts: RunOptions) -> BenchResult<i32> {
    let cfg = opts.resolve()?;
    let environment = EnvironmentInfo::detect();
    info!(environment = %environment.summary(), "detected environment");

    let suite = build_suite(&cfg, environment)?;
    let outcome = suite.run();
    let report = Report::build(&outcome);

    print!("{}", render_text(&report));

    if let Some(path) = &opts.json {
        write_json(path, &report)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    if let Some(path) = &opts.markdown {
        write_text(path, &render_markdown(&report))?;
        info!(path = %path.display(), "wrote Markdown report");
    }
    if let Some(path) = &opts.csv {
        CsvExporter::new().export(&outcome.results(), path)?;
        info!(path = %path.display(), "wrote CSV results");
    }

    if opts.fail_on_mismatch && report.has_mismatch() {
        return Ok(MISMATCH_EXIT_CODE);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let opts = RunOptions {
            engines: vec!["validator".into()],
            iterations: Some(7),
            timeout_ms: Some(0),
            parallel_compile: true,
            ..Default::default()
        };
        let cfg = opts.resolve().unwrap();
        assert_eq!(cfg.engine_names(), vec!["validator"]);
        assert_eq!(cfg.run.measured_iterations, 7);
        assert_eq!(cfg.run.warmup_iterations, 1000);
        assert!(cfg.run.pair_budget().is_none());
        assert!(cfg.run.parallel_compile);
    }

    #[test]
    fn test_unknown_engine_fails_before_run() {
        let opts = RunOptions {
            engines: vec!["nope".into()],
            ..Default::default()
        };
        assert!(opts.resolve().is_err());
    }

    #[test]
    fn test_build_suite_registers_selection() {
        let cfg = SuiteConfig {
            engines: Some(vec!["boon".into(), "jsonschema".into()]),
            workloads: Some(vec!["simple".into()]),
            ..Default::default()
        };
        let suite = build_suite(&cfg, EnvironmentInfo::default()).unwrap();
        let ids: Vec<_> = suite.adapters().iter().map(|a| a.engine_id().to_string()).collect();
        assert_eq!(ids, vec!["boon", "jsonschema"]);
        assert_eq!(suite.name(), "simple");
        assert!(!suite.fixtures().is_empty());
    }
}
