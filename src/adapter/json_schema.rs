//! Adapter for the `jsonschema` crate (draft 2020-12).

use std::collections::BTreeSet;
use std::sync::Arc;

use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use tracing::debug;

use super::traits::{Capabilities, CompiledValidator, EngineAdapter, Outcome};
use super::{document, path};
use crate::model::{ObjectSchema, SchemaCatalog};
use crate::{BenchError, BenchResult};

pub const ENGINE_ID: &str = "jsonschema";
const ENGINE_VERSION: &str = "0.28";

#[derive(Debug, Default, Clone)]
pub struct JsonSchemaAdapter;

impl JsonSchemaAdapter {
    pub fn new() -> Self {
        JsonSchemaAdapter
    }

    /// The JSON Schema document the engine is compiled from.
    pub fn translate(&self, schema: &ObjectSchema, catalog: &SchemaCatalog) -> BenchResult<Value> {
        document::translate(schema, catalog)
    }
}

impl EngineAdapter for JsonSchemaAdapter {
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
        let document = self.translate(schema, catalog)?;
        debug!(schema = %schema.id(), "compiling json schema document");

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&document)
            .map_err(|err| BenchError::SchemaTranslation {
                engine: ENGINE_ID.to_string(),
                schema: schema.id().to_string(),
                reason: err.to_string(),
            })?;
        Ok(Arc::new(CompiledJsonSchema { validator }))
    }
}

struct CompiledJsonSchema {
    validator: Validator,
}

impl CompiledValidator for CompiledJsonSchema {
    fn validate(&self, payload: &Value) -> Outcome {
        let mut violations = BTreeSet::new();
        for error in self.validator.iter_errors(payload) {
            let at = path::from_pointer(&error.instance_path.to_string());
            let field = match &error.kind {
                ValidationErrorKind::Required { property } => match property.as_str() {
                    Some(name) => path::join(&at, name),
                    None => at,
                },
                _ => at,
            };
            violations.insert(field);
        }
        Outcome::from_violations(violations)
    }
}
