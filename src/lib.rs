pub mod adapter;
pub mod bench;
pub mod core;
pub mod fixture;
pub mod model;
pub mod report;
pub mod runner;
pub mod storage;

use thiserror::Error;

pub use adapter::{CompiledValidator, EngineAdapter, Outcome};
pub use fixture::{Expected, Fixture, FixtureRegistry};
pub use model::{FieldConstraint, ObjectSchema, SchemaCatalog, SchemaId, SchemaRef, define_schema};
pub use runner::{Suite, SuiteRun};

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },
    #[error("invalid constraint on '{schema}.{field}': {reason}")]
    InvalidConstraint {
        schema: String,
        field: String,
        reason: String,
    },
    #[error("schema '{0}' is already defined")]
    DuplicateSchema(String),
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),
    #[error("fixture '{fixture}' is already registered for schema '{schema}'")]
    DuplicateFixture { schema: String, fixture: String },
    #[error("engine '{0}' is already registered")]
    DuplicateEngine(String),
    #[error("engine '{engine}' cannot translate schema '{schema}': {reason}")]
    SchemaTranslation {
        engine: String,
        schema: String,
        reason: String,
    },
    #[error(
        "measurement of '{engine}' on '{fixture}' exceeded its {budget_ms}ms budget after {completed} samples"
    )]
    MeasurementTimeout {
        engine: String,
        fixture: String,
        budget_ms: u64,
        completed: usize,
    },
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;

/// RFC 3339 timestamp for "now", empty when the clock cannot be formatted.
pub fn now_string() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha256::digest;
    digest(bytes)
}
