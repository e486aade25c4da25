//! Benchmark runner: compile once, warm up, then time every call.

pub mod aggregate;
mod measure;
pub mod suite;

pub use suite::{Exclusion, SampleLog, Suite, SuiteRun, Truncation};
