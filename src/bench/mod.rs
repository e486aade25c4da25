//! Command implementations behind the `validator-bench` binary.

pub mod config;
pub mod list_cmd;
pub mod run_cmd;

pub use config::{SuiteConfig, load_suite_config};
pub use run_cmd::{MISMATCH_EXIT_CODE, RunOptions, build_suite};
