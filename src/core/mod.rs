//! Core record types shared across the harness.

pub mod env;
pub mod schema;

pub use env::EnvironmentInfo;
pub use schema::{BenchmarkResult, BenchmarkSample, EngineInfo, RunConfig, SCHEMA_VERSION, TimingStat};
