//! Object schemas and the catalog that resolves references between them.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::Serialize;

use crate::{BenchError, BenchResult};

use super::constraint::{FieldConstraint, SchemaId, SchemaRef};

/// Ordered, immutable set of field constraints.
///
/// Field order carries no validation meaning; it only keeps reports and
/// translated engine schemas stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSchema {
    id: SchemaId,
    fields: Vec<FieldConstraint>,
}

impl ObjectSchema {
    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    pub fn fields(&self) -> &[FieldConstraint] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Schemas referenced directly by this schema's fields.
    pub fn references(&self) -> impl Iterator<Item = &SchemaRef> {
        self.fields.iter().flat_map(|f| f.schema_refs())
    }
}

/// Build an immutable schema, checking field names and kind invariants.
pub fn define_schema(
    id: impl Into<SchemaId>,
    fields: Vec<FieldConstraint>,
) -> BenchResult<ObjectSchema> {
    let id = id.into();
    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(BenchError::DuplicateField {
                schema: id.to_string(),
                field: field.name.clone(),
            });
        }
        field
            .check_invariants()
            .map_err(|reason| BenchError::InvalidConstraint {
                schema: id.to_string(),
                field: field.name.clone(),
                reason,
            })?;
    }
    Ok(ObjectSchema { id, fields })
}

/// Registry of named schemas. References are resolved here, at compile
/// time, so schemas may reference each other (or themselves) freely.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: BTreeMap<SchemaId, ObjectSchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema. Its references do not need to resolve yet.
    pub fn insert(&mut self, schema: ObjectSchema) -> BenchResult<&ObjectSchema> {
        if self.schemas.contains_key(schema.id()) {
            return Err(BenchError::DuplicateSchema(schema.id().to_string()));
        }
        let id = schema.id().clone();
        Ok(self.schemas.entry(id).or_insert(schema))
    }

    pub fn get(&self, id: &SchemaId) -> Option<&ObjectSchema> {
        self.schemas.get(id)
    }

    pub fn contains(&self, id: &SchemaId) -> bool {
        self.schemas.contains_key(id)
    }

    pub fn resolve(&self, reference: &SchemaRef) -> BenchResult<&ObjectSchema> {
        self.get(reference.id())
            .ok_or_else(|| BenchError::UnknownSchema(reference.id().to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &SchemaId> {
        self.schemas.keys()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The root schema followed by every schema reachable from it, each
    /// exactly once, in breadth-first order.
    pub fn closure(&self, root: &SchemaId) -> BenchResult<Vec<&ObjectSchema>> {
        let first = self
            .get(root)
            .ok_or_else(|| BenchError::UnknownSchema(root.to_string()))?;

        let mut visited: BTreeSet<&SchemaId> = BTreeSet::new();
        let mut queue = VecDeque::from([first]);
        let mut out = Vec::new();
        visited.insert(first.id());

        while let Some(schema) = queue.pop_front() {
            for reference in schema.references() {
                let target = self.resolve(reference)?;
                if visited.insert(target.id()) {
                    queue.push_back(target);
                }
            }
            out.push(schema);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::constraint::ItemConstraint;

    fn person_with_friends() -> ObjectSchema {
        define_schema(
            "person",
            vec![
                FieldConstraint::string("name").required(),
                FieldConstraint::object("bestFriend", SchemaRef::to("person")),
                FieldConstraint::array("otherFriends", ItemConstraint::Schema(SchemaRef::to("person"))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = define_schema(
            "dup",
            vec![FieldConstraint::string("a"), FieldConstraint::number("a")],
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::DuplicateField { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_invalid_constraint_names_field() {
        let err = define_schema("bad", vec![FieldConstraint::boolean("flag").min(1.0)]).unwrap_err();
        match err {
            BenchError::InvalidConstraint { schema, field, .. } => {
                assert_eq!(schema, "bad");
                assert_eq!(field, "flag");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_reference_closure_terminates() {
        let mut catalog = SchemaCatalog::new();
        catalog.insert(person_with_friends()).unwrap();
        let closure = catalog.closure(&SchemaId::new("person")).unwrap();
        assert_eq!(closure.len(), 1);
        assert_eq!(closure[0].id().as_str(), "person");
    }

    #[test]
    fn test_closure_reports_dangling_reference() {
        let mut catalog = SchemaCatalog::new();
        catalog
            .insert(
                define_schema(
                    "team",
                    vec![FieldConstraint::object("lead", SchemaRef::to("missing"))],
                )
                .unwrap(),
            )
            .unwrap();
        let err = catalog.closure(&SchemaId::new("team")).unwrap_err();
        assert!(matches!(err, BenchError::UnknownSchema(ref id) if id == "missing"));
    }

    #[test]
    fn test_closure_visits_each_schema_once() {
        let mut catalog = SchemaCatalog::new();
        catalog
            .insert(
                define_schema(
                    "team",
                    vec![
                        FieldConstraint::object("lead", SchemaRef::to("person")),
                        FieldConstraint::array("members", ItemConstraint::Schema(SchemaRef::to("person"))),
                    ],
                )
                .unwrap(),
            )
            .unwrap();
        catalog.insert(person_with_friends()).unwrap();
        let ids: Vec<_> = catalog
            .closure(&SchemaId::new("team"))
            .unwrap()
            .into_iter()
            .map(|s| s.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["team", "person"]);
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let mut catalog = SchemaCatalog::new();
        catalog.insert(person_with_friends()).unwrap();
        assert!(matches!(
            catalog.insert(person_with_friends()),
            Err(BenchError::DuplicateSchema(_))
        ));
    }
}
