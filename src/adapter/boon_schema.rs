//! Adapter for the `boon` JSON Schema compiler.
//!
//! Compiled from the same draft 2020-12 document as the `jsonschema`
//! adapter, so the two engines cross-check each other on identical input.

use std::collections::BTreeSet;
use std::sync::Arc;

use boon::{Compiler, ErrorKind, SchemaIndex, Schemas, ValidationError};
use serde_json::Value;
use tracing::debug;

use super::traits::{Capabilities, CompiledValidator, EngineAdapter, Outcome};
use super::{document, path};
use crate::model::{ObjectSchema, SchemaCatalog};
use crate::{BenchError, BenchResult};

pub const ENGINE_ID: &str = "boon";
const ENGINE_VERSION: &str = "0.6";

#[derive(Debug, Default, Clone)]
pub struct BoonAdapter;

impl BoonAdapter {
    pub fn new() -> Self {
        BoonAdapter
    }
}

fn resource_url(schema: &ObjectSchema) -> String {
    format!("http://validator-bench.local/{}.json", schema.id())
}

impl EngineAdapter for BoonAdapter {
    fn engine_id(&self) -> &str {
        ENGINE_ID
    }

    fn version(&self) -> Option<String> {
        Some(ENGINE_VERSION.to_string())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::full()
    }

    fn compile(
        &self,
        schema: &ObjectSchema,
        catalog: &SchemaCatalog,
    ) -> BenchResult<Arc<dyn CompiledValidator>> {
        self.capabilities()
            .ensure_expressible(ENGINE_ID, schema, catalog)?;
        let document = document::translate(schema, catalog)?;
        let url = resource_url(schema);
        debug!(schema = %schema.id(), %url, "compiling boon schema");

        let translation_error = |err: &dyn std::fmt::Display| BenchError::SchemaTranslation {
            engine: ENGINE_ID.to_string(),
            schema: schema.id().to_string(),
            reason: err.to_string(),
        };

        let mut schemas = Schemas::new();
        let mut compiler = Compiler::new();
        compiler.enable_format_assertions();
        compiler
            .add_resource(&url, document)
            .map_err(|e| translation_error(&e))?;
        let index = compiler
            .compile(&url, &mut schemas)
            .map_err(|e| translation_error(&e))?;
        Ok(Arc::new(CompiledBoon { schemas, index }))
    }
}

struct CompiledBoon {
    schemas: Schemas,
    index: SchemaIndex,
}

impl CompiledValidator for CompiledBoon {
    fn validate(&self, payload: &Value) -> Outcome {
        match self.schemas.validate(payload, self.index) {
            Ok(()) => Outcome::valid(),
            Err(error) => {
                let mut violations = BTreeSet::new();
                collect_leaves(&error, &mut violations);
                Outcome::from_violations(violations)
            }
        }
    }
}

/// Only leaf errors name a failing keyword; inner nodes are `$ref` and
/// schema groupings.
fn collect_leaves(error: &ValidationError, out: &mut BTreeSet<String>) {
    if !error.causes.is_empty() {
        for cause in &error.causes {
            collect_leaves(cause, out);
        }
        return;
    }
    let at = path::from_pointer(&error.instance_location.to_string());
    match &error.kind {
        ErrorKind::Required { want } => {
            for property in want {
                out.insert(path::join(&at, property));
            }
        }
        _ => {
            out.insert(at);
        }
    }
}
