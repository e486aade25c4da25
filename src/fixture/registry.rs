use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use super::{Expected, Fixture};
use crate::model::{SchemaCatalog, SchemaId};
use crate::{BenchError, BenchResult};

/// Fixtures keyed by `(schema, id)`, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct FixtureRegistry {
    fixtures: Vec<Arc<Fixture>>,
    keys: HashSet<(SchemaId, String)>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payload against a schema that must already be in `catalog`.
    pub fn register(
        &mut self,
        catalog: &SchemaCatalog,
        schema: impl Into<SchemaId>,
        id: impl Into<String>,
        payload: Value,
        expected: Expected,
    ) -> BenchResult<Arc<Fixture>> {
        let schema = schema.into();
        let id = id.into();
        if !catalog.contains(&schema) {
            return Err(BenchError::UnknownSchema(schema.to_string()));
        }
        if !self.keys.insert((schema.clone(), id.clone())) {
            return Err(BenchError::DuplicateFixture {
                schema: schema.to_string(),
                fixture: id,
            });
        }
        let fixture = Arc::new(Fixture::new(schema, id, payload, expected));
        self.fixtures.push(Arc::clone(&fixture));
        Ok(fixture)
    }

    /// Fixtures of one schema, in registration order.
    pub fn get(&self, schema: &SchemaId) -> Vec<Arc<Fixture>> {
        self.fixtures
            .iter()
            .filter(|f| &f.schema == schema)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> &[Arc<Fixture>] {
        &self.fixtures
    }

    /// Schemas that have at least one fixture, in first-registration order.
    pub fn schemas(&self) -> Vec<SchemaId> {
        let mut out: Vec<SchemaId> = Vec::new();
        for fixture in &self.fixtures {
            if !out.contains(&fixture.schema) {
                out.push(fixture.schema.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldConstraint, define_schema};
    use serde_json::json;

    fn catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();
        catalog
            .insert(define_schema("a", vec![FieldConstraint::string("x")]).unwrap())
            .unwrap();
        catalog
            .insert(define_schema("b", vec![FieldConstraint::number("y")]).unwrap())
            .unwrap();
        catalog
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let mut registry = FixtureRegistry::new();
        let err = registry
            .register(&catalog(), "nope", "f", json!({}), Expected::Valid)
            .unwrap_err();
        assert!(matches!(err, BenchError::UnknownSchema(ref s) if s == "nope"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_fixture_rejected() {
        let catalog = catalog();
        let mut registry = FixtureRegistry::new();
        registry.register(&catalog, "a", "f", json!({}), Expected::Valid).unwrap();
        registry.register(&catalog, "b", "f", json!({}), Expected::Valid).unwrap();
        assert!(matches!(
            registry.register(&catalog, "a", "f", json!({}), Expected::Valid),
            Err(BenchError::DuplicateFixture { .. })
        ));
    }

    #[test]
    fn test_get_keeps_registration_order() {
        let catalog = catalog();
        let mut registry = FixtureRegistry::new();
        for id in ["z", "m", "a"] {
            registry.register(&catalog, "b", id, json!({}), Expected::Valid).unwrap();
        }
        registry.register(&catalog, "a", "only", json!({}), Expected::Valid).unwrap();
        let ids: Vec<_> = registry.get(&"b".into()).iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids, vec!["z", "m", "a"]);
        assert_eq!(registry.schemas(), vec![SchemaId::new("b"), SchemaId::new("a")]);
    }

    #[test]
    fn test_fixtures_are_shared_not_copied() {
        let catalog = catalog();
        let mut registry = FixtureRegistry::new();
        let f = registry.register(&catalog, "a", "f", json!({"x": "1"}), Expected::Valid).unwrap();
        assert!(Arc::ptr_eq(&f, &registry.get(&"a".into())[0]));
    }
}
