//! The suite context: schemas, fixtures and adapters registered up front,
//! then one `run` that compiles and measures everything.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::aggregate;
use super::measure::{PairEnd, PairJob, measure_pair, panic_message};
use crate::adapter::{CompiledValidator, EngineAdapter};
use crate::core::{BenchmarkResult, BenchmarkSample, EngineInfo, EnvironmentInfo, RunConfig};
use crate::fixture::{Expected, Fixture, FixtureRegistry, Workload};
use crate::model::{FieldConstraint, ObjectSchema, SchemaCatalog, SchemaId};
use crate::{BenchError, BenchResult};

/// An adapter left out of one schema's comparison because it could not
/// compile it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub engine: String,
    pub schema: String,
    pub reason: String,
}

/// A pair that stopped before recording every requested sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truncation {
    pub engine: String,
    pub schema: String,
    pub fixture: String,
    pub completed: usize,
    pub requested: usize,
    pub reason: String,
}

/// Append-only log of timed calls for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleLog {
    samples: Vec<BenchmarkSample>,
}

impl SampleLog {
    fn append(&mut self, sample: BenchmarkSample) {
        self.samples.push(sample);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkSample> {
        self.samples.iter()
    }

    /// Samples of one pair, in call order.
    pub fn for_pair<'a>(
        &'a self,
        engine: &'a str,
        schema: &'a str,
        fixture: &'a str,
    ) -> impl Iterator<Item = &'a BenchmarkSample> {
        self.samples.iter().filter(move |s| {
            &*s.engine_id == engine && &*s.schema_id == schema && &*s.fixture_id == fixture
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Everything one `Suite::run` produced.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteRun {
    pub suite: String,
    pub timestamp: String,
    pub config: RunConfig,
    pub environment: EnvironmentInfo,
    pub engines: Vec<EngineInfo>,
    pub fixtures: Vec<Arc<Fixture>>,
    #[serde(skip)]
    pub samples: SampleLog,
    pub exclusions: Vec<Exclusion>,
    pub truncations: Vec<Truncation>,
    /// Workers left running after a call outlived its pair budget. They
    /// are detached, not killed, and may still hold a CPU until the
    /// process exits.
    pub abandoned_workers: usize,
}

impl SuiteRun {
    /// Aggregates recomputed from the sample log.
    pub fn results(&self) -> Vec<BenchmarkResult> {
        aggregate::results(self)
    }

    pub fn is_excluded(&self, engine: &str, schema: &str) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.engine == engine && e.schema == schema)
    }

    pub fn truncation(&self, engine: &str, schema: &str, fixture: &str) -> Option<&Truncation> {
        self.truncations
            .iter()
            .find(|t| t.engine == engine && t.schema == schema && t.fixture == fixture)
    }
}

/// Explicit benchmark context: `new`, register, `run`, report, drop.
pub struct Suite {
    name: String,
    config: RunConfig,
    catalog: SchemaCatalog,
    fixtures: FixtureRegistry,
    adapters: Vec<Arc<dyn EngineAdapter>>,
    environment: EnvironmentInfo,
}

type Compiled = HashMap<(usize, SchemaId), Arc<dyn CompiledValidator>>;

impl Suite {
    pub fn new(name: impl Into<String>, config: RunConfig) -> Self {
        Suite {
            name: name.into(),
            config,
            catalog: SchemaCatalog::new(),
            fixtures: FixtureRegistry::new(),
            adapters: Vec::new(),
            environment: EnvironmentInfo::default(),
        }
    }

    /// Attach environment details recorded into every run.
    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = environment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn fixtures(&self) -> &FixtureRegistry {
        &self.fixtures
    }

    pub fn adapters(&self) -> &[Arc<dyn EngineAdapter>] {
        &self.adapters
    }

    pub fn define_schema(
        &mut self,
        id: impl Into<SchemaId>,
        fields: Vec<FieldConstraint>,
    ) -> BenchResult<&ObjectSchema> {
        let schema = crate::model::define_schema(id, fields)?;
        self.catalog.insert(schema)
    }

    pub fn add_schema(&mut self, schema: ObjectSchema) -> BenchResult<&ObjectSchema> {
        self.catalog.insert(schema)
    }

    pub fn register_fixture(
        &mut self,
        schema: impl Into<SchemaId>,
        id: impl Into<String>,
        payload: Value,
        expected: Expected,
    ) -> BenchResult<Arc<Fixture>> {
        self.fixtures
            .register(&self.catalog, schema, id, payload, expected)
    }

    /// Register a workload's schemas and fixtures.
    pub fn add_workload(&mut self, workload: &Workload) -> BenchResult<()> {
        for schema in &workload.schemas {
            self.add_schema(schema.clone())?;
        }
        for spec in &workload.fixtures {
            self.register_fixture(
                spec.schema.clone(),
                spec.id.clone(),
                spec.payload.clone(),
                spec.expected.clone(),
            )?;
        }
        Ok(())
    }

    pub fn add_adapter(&mut self, adapter: Arc<dyn EngineAdapter>) -> BenchResult<()> {
        if self
            .adapters
            .iter()
            .any(|a| a.engine_id() == adapter.engine_id())
        {
            return Err(BenchError::DuplicateEngine(adapter.engine_id().to_string()));
        }
        self.adapters.push(adapter);
        Ok(())
    }

    /// Compile every schema with every adapter once, then measure each
    /// pair serially. Per-adapter failures are recorded, never raised.
    pub fn run(&self) -> SuiteRun {
        let schemas = self.fixtures.schemas();
        let mut exclusions = Vec::new();

        info!(
            suite = %self.name,
            engines = self.adapters.len(),
            schemas = schemas.len(),
            fixtures = self.fixtures.len(),
            parallel = self.config.parallel_compile,
            "compiling validators"
        );
        let compiled = self.compile_all(&schemas, &mut exclusions);

        let mut samples = SampleLog::default();
        let mut truncations = Vec::new();
        let mut abandoned_workers = 0;
        let requested = self.config.measured_iterations as usize;

        for (index, adapter) in self.adapters.iter().enumerate() {
            let engine: Arc<str> = Arc::from(adapter.engine_id());
            for schema in &schemas {
                let Some(validator) = compiled.get(&(index, schema.clone())) else {
                    continue;
                };
                let schema_id: Arc<str> = Arc::from(schema.as_str());
                for fixture in self.fixtures.get(schema) {
                    let fixture_id: Arc<str> = Arc::from(fixture.id.as_str());
                    let measurement = measure_pair(PairJob {
                        engine: Arc::clone(&engine),
                        validator: Arc::clone(validator),
                        fixture: Arc::clone(&fixture),
                        warmup: self.config.warmup_iterations,
                        measured: self.config.measured_iterations,
                        budget: self.config.pair_budget(),
                    });

                    let completed = measurement.samples.len();
                    if measurement.end == PairEnd::Hung {
                        abandoned_workers += 1;
                    }
                    for (duration_nanos, outcome) in measurement.samples {
                        samples.append(BenchmarkSample {
                            engine_id: Arc::clone(&engine),
                            schema_id: Arc::clone(&schema_id),
                            fixture_id: Arc::clone(&fixture_id),
                            duration_nanos,
                            outcome,
                        });
                    }

                    if let Some(reason) = self.truncation_reason(&engine, &fixture, &measurement.end, completed) {
                        warn!(engine = %engine, fixture = %fixture.key(), completed, requested, %reason, "pair truncated");
                        truncations.push(Truncation {
                            engine: engine.to_string(),
                            schema: schema.to_string(),
                            fixture: fixture.id.clone(),
                            completed,
                            requested,
                            reason,
                        });
                    }
                    info!(
                        engine = %engine,
                        fixture = %fixture.key(),
                        samples = completed,
                        elapsed_ms = measurement.elapsed.as_millis() as u64,
                        "measured pair"
                    );
                }
            }
        }

        SuiteRun {
            suite: self.name.clone(),
            timestamp: crate::now_string(),
            config: self.config.clone(),
            environment: self.environment.clone(),
            engines: self
                .adapters
                .iter()
                .map(|a| EngineInfo {
                    id: a.engine_id().to_string(),
                    version: a.version(),
                    capabilities: a.capabilities(),
                })
                .collect(),
            fixtures: self.fixtures.all().to_vec(),
            samples,
            exclusions,
            truncations,
            abandoned_workers,
        }
    }

    fn truncation_reason(
        &self,
        engine: &str,
        fixture: &Fixture,
        end: &PairEnd,
        completed: usize,
    ) -> Option<String> {
        let timeout = || {
            BenchError::MeasurementTimeout {
                engine: engine.to_string(),
                fixture: fixture.key(),
                budget_ms: self.config.per_pair_timeout_millis,
                completed,
            }
            .to_string()
        };
        match end {
            PairEnd::Completed => None,
            PairEnd::Deadline => Some(timeout()),
            PairEnd::Hung => Some(format!("{}; a call never returned", timeout())),
            PairEnd::Panicked(reason) => Some(format!("validator panicked: {reason}")),
        }
    }

    fn compile_all(&self, schemas: &[SchemaId], exclusions: &mut Vec<Exclusion>) -> Compiled {
        type Attempt = (SchemaId, BenchResult<Arc<dyn CompiledValidator>>);

        let compile_one = |adapter: &Arc<dyn EngineAdapter>| -> Vec<Attempt> {
            schemas
                .iter()
                .map(|id| {
                    let result = self
                        .catalog
                        .get(id)
                        .ok_or_else(|| BenchError::UnknownSchema(id.to_string()))
                        .and_then(|schema| {
                            panic::catch_unwind(AssertUnwindSafe(|| adapter.compile(schema, &self.catalog)))
                                .unwrap_or_else(|payload| {
                                    Err(BenchError::Message(format!(
                                        "{} panicked while compiling: {}",
                                        adapter.engine_id(),
                                        panic_message(payload)
                                    )))
                                })
                        });
                    (id.clone(), result)
                })
                .collect()
        };

        let attempts: Vec<Vec<Attempt>> = if self.config.parallel_compile {
            thread::scope(|scope| {
                let handles: Vec<_> = self
                    .adapters
                    .iter()
                    .map(|adapter| scope.spawn(move || compile_one(adapter)))
                    .collect();
                handles
                    .into_iter()
                    .zip(&self.adapters)
                    .map(|(handle, adapter)| {
                        handle.join().unwrap_or_else(|_| {
                            let reason = format!("{} panicked while compiling", adapter.engine_id());
                            schemas
                                .iter()
                                .map(|id| (id.clone(), Err(BenchError::Message(reason.clone()))))
                                .collect()
                        })
                    })
                    .collect()
            })
        } else {
            self.adapters.iter().map(compile_one).collect()
        };

        let mut compiled = Compiled::new();
        for (index, (adapter, results)) in self.adapters.iter().zip(attempts).enumerate() {
            for (schema, result) in results {
                match result {
                    Ok(validator) => {
                        compiled.insert((index, schema), validator);
                    }
                    Err(err) => {
                        warn!(engine = adapter.engine_id(), schema = %schema, error = %err, "engine excluded");
                        exclusions.push(Exclusion {
                            engine: adapter.engine_id().to_string(),
                            schema: schema.to_string(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }
        compiled
    }
}
