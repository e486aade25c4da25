use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::adapter::BUILTIN_ENGINES;
use crate::core::RunConfig;
use crate::fixture::workload_names;
use crate::{BenchError, BenchResult};

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuiteConfig {
    pub run: RunConfig,
    /// Engine ids to benchmark; all built-ins when absent.
    pub engines: Option<Vec<String>>,
    /// Workload names to register; all built-ins when absent.
    pub workloads: Option<Vec<String>>,
}

impl SuiteConfig {
    /// Engine ids in benchmark order.
    pub fn engine_names(&self) -> Vec<String> {
        match &self.engines {
            Some(names) => names.clone(),
            None => BUILTIN_ENGINES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn workload_names(&self) -> Vec<String> {
        match &self.workloads {
            Some(names) => names.clone(),
            None => workload_names().iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Reject unknown engine or workload names and empty selections.
    pub fn check(&self) -> BenchResult<()> {
        let engines = self.engine_names();
        if engines.is_empty() {
            return Err(BenchError::Message("no engines selected".into()));
        }
        if let Some(unknown) = engines.iter().find(|e| !BUILTIN_ENGINES.contains(&e.as_str())) {
            return Err(BenchError::Message(format!(
                "unknown engine '{unknown}' (available: {})",
                BUILTIN_ENGINES.join(", ")
            )));
        }

        let workloads = self.workload_names();
        if workloads.is_empty() {
            return Err(BenchError::Message("no workloads selected".into()));
        }
        let known = workload_names();
        if let Some(unknown) = workloads.iter().find(|w| !known.contains(&w.as_str())) {
            return Err(BenchError::Message(format!(
                "unknown workload '{unknown}' (available: {})",
                known.join(", ")
            )));
        }

        if self.run.measured_iterations == 0 {
            return Err(BenchError::Message("measured_iterations must be at least 1".into()));
        }
        Ok(())
    }
}

/// Load a suite config; `.yaml`/`.yml` files are YAML, anything else TOML.
pub fn load_suite_config(path: &Path) -> BenchResult<SuiteConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let cfg: SuiteConfig = if yaml {
        serde_yaml::from_str(&text)
            .map_err(|e| BenchError::Message(format!("invalid config {}: {e}", path.display())))?
    } else {
        toml::from_str(&text)
            .map_err(|e| BenchError::Message(format!("invalid config {}: {e}", path.display())))?
    };
    Ok(cfg)
}
