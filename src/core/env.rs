//! Machine and checkout details recorded with every report.

use std::process::Command;

use serde::{Deserialize, Serialize};

/// Where a benchmark matrix was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_cpus: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ram_bytes: Option<u64>,

    pub os: String,

    pub arch: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_sha: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,

    pub harness_version: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        EnvironmentInfo {
            cpu_model: None,
            cpu_cores: None,
            logical_cpus: None,
            total_ram_bytes: None,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: None,
            git_sha: None,
            git_dirty: None,
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl EnvironmentInfo {
    /// Inspect the host with `sysinfo` and the checkout with `git`.
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new_all();
        sys.refresh_all();

        EnvironmentInfo {
            cpu_model: sys.cpus().first().map(|c| c.brand().trim().to_string()),
            cpu_cores: sys.physical_core_count().map(|c| c as u32),
            logical_cpus: Some(sys.cpus().len() as u32),
            total_ram_bytes: Some(sys.total_memory()),
            os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
            hostname: System::host_name(),
            git_sha: git(&["rev-parse", "HEAD"]).filter(|s| !s.is_empty()),
            git_dirty: git(&["status", "--porcelain"]).map(|s| !s.is_empty()),
            ..Self::default()
        }
    }

    /// One-line summary for report headers.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} {}", self.os, self.arch)];
        if let Some(cpu) = &self.cpu_model {
            parts.push(cpu.clone());
        }
        if let Some(cores) = self.cpu_cores {
            parts.push(format!("{cores} cores"));
        }
        if let Some(sha) = &self.git_sha {
            let short: String = sha.chars().take(10).collect();
            let dirty = if self.git_dirty == Some(true) { "-dirty" } else { "" };
            parts.push(format!("git {short}{dirty}"));
        }
        parts.join(", ")
    }
}

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detect_has_os() {
        let env = EnvironmentInfo::detect();
        assert!(!env.os.is_empty());
    }

    #[test]
    fn test_environment_default_is_lightweight() {
        let env = EnvironmentInfo::default();
        assert!(env.cpu_model.is_none());
        assert!(env.git_sha.is_none());
        assert_eq!(env.summary(), format!("{} {}", env.os, env.arch));
    }

    #[test]
    fn test_summary_marks_dirty_checkout() {
        let env = EnvironmentInfo {
            git_sha: Some("0123456789abcdef".to_string()),
            git_dirty: Some(true),
            ..EnvironmentInfo::default()
        };
        assert!(env.summary().ends_with("git 0123456789-dirty"));
    }
}
