//! Mock adapter for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use super::traits::{Capabilities, CompiledValidator, EngineAdapter, Outcome};
use crate::model::{ObjectSchema, SchemaCatalog};
use crate::{BenchError, BenchResult};

/// Configuration for mock adapter responses.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Engine id to report
    pub name: String,
    /// Version to report
    pub version: Option<String>,
    /// Capabilities to report
    pub capabilities: Capabilities,
    /// Outcome returned for every payload
    pub outcome: Outcome,
    /// Sleep inside every validate call
    pub delay: Option<Duration>,
    /// Whether compile should fail
    pub compile_fails: bool,
    /// Whether compile should panic
    pub compile_panics: bool,
    /// Whether validate should panic
    pub validate_panics: bool,
}

impl MockConfig {
    /// A mock that accepts everything immediately.
    pub fn new(name: impl Into<String>) -> Self {
        MockConfig {
            name: name.into(),
            version: Some("mock-1.0.0".to_string()),
            capabilities: Capabilities::full(),
            outcome: Outcome::valid(),
            delay: None,
            compile_fails: false,
            compile_panics: false,
            validate_panics: false,
        }
    }

    /// Return `outcome` for every payload.
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Sleep this long inside every validate call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set capabilities.
    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.capabilities = caps;
        self
    }

    /// Make compile fail.
    pub fn compile_fails(mut self) -> Self {
        self.compile_fails = true;
        self
    }

    /// Make compile panic.
    pub fn compile_panics(mut self) -> Self {
        self.compile_panics = true;
        self
    }

    /// Make validate panic.
    pub fn validate_panics(mut self) -> Self {
        self.validate_panics = true;
        self
    }
}

/// Call counters shared between a mock adapter and its compiled validators.
#[derive(Debug, Clone, Default)]
pub struct MockCounters {
    compiles: Arc<AtomicUsize>,
    validations: Arc<AtomicUsize>,
}

impl MockCounters {
    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

/// Adapter returning configurable fake outcomes without validating.
pub struct MockAdapter {
    config: MockConfig,
    counters: MockCounters,
}

impl MockAdapter {
    pub fn new(config: MockConfig) -> Self {
        MockAdapter {
            config,
            counters: MockCounters::default(),
        }
    }

    /// Create a mock adapter with default configuration.
    pub fn default_mock() -> Self {
        Self::new(MockConfig::new("mock"))
    }

    pub fn counters(&self) -> MockCounters {
        self.counters.clone()
    }
}

impl EngineAdapter for MockAdapter {
    fn engine_id(&self) -> &str {
        &self.config.name
    }

    fn version(&self) -> Option<String> {
        self.config.version.clone()
    }

    fn capabilities(&self) -> Capabilities {
        self.config.capabilities.clone()
    }

    fn compile(
        &self,
        schema: &ObjectSchema,
        catalog: &SchemaCatalog,
    ) -> BenchResult<Arc<dyn CompiledValidator>> {
        self.counters.compiles.fetch_add(1, Ordering::SeqCst);
        if self.config.compile_panics {
            panic!("mock compile panicked");
        }
        if self.config.compile_fails {
            return Err(BenchError::SchemaTranslation {
                engine: self.config.name.clone(),
                schema: schema.id().to_string(),
                reason: "mock compile failure".to_string(),
            });
        }
        self.config
            .capabilities
            .ensure_expressible(&self.config.name, schema, catalog)?;
        Ok(Arc::new(CompiledMock {
            outcome: self.config.outcome.clone(),
            delay: self.config.delay,
            panics: self.config.validate_panics,
            validations: Arc::clone(&self.counters.validations),
        }))
    }
}

struct CompiledMock {
    outcome: Outcome,
    delay: Option<Duration>,
    panics: bool,
    validations: Arc<AtomicUsize>,
}

impl CompiledValidator for CompiledMock {
    fn validate(&self, _payload: &Value) -> Outcome {
        self.validations.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("mock validator panicked");
        }
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldConstraint, define_schema};
    use serde_json::json;

    fn catalog() -> (SchemaCatalog, ObjectSchema) {
        let schema = define_schema("s", vec![FieldConstraint::string("a")]).unwrap();
        let mut catalog = SchemaCatalog::new();
        catalog.insert(schema.clone()).unwrap();
        (catalog, schema)
    }

    #[test]
    fn test_mock_counts_calls() {
        let (catalog, schema) = catalog();
        let adapter = MockAdapter::new(MockConfig::new("m").with_outcome(Outcome::invalid(["a"])));
        let counters = adapter.counters();
        let compiled = adapter.compile(&schema, &catalog).unwrap();
        for _ in 0..3 {
            assert_eq!(compiled.validate(&json!({})), Outcome::invalid(["a"]));
        }
        assert_eq!(counters.compiles(), 1);
        assert_eq!(counters.validations(), 3);
    }

    #[test]
    fn test_mock_compile_failure() {
        let (catalog, schema) = catalog();
        let adapter = MockAdapter::new(MockConfig::new("m").compile_fails());
        assert!(matches!(
            adapter.compile(&schema, &catalog),
            Err(BenchError::SchemaTranslation { .. })
        ));
    }
}
