//! Adapter trait, normalized outcome, and engine capabilities.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{FieldConstraint, FieldKind, Format, ItemConstraint, ObjectSchema, SchemaCatalog};
use crate::{BenchError, BenchResult};

/// Engine-agnostic validation result.
///
/// `violations` holds normalized dotted field paths such as `age`,
/// `bestFriend.age` or `otherFriends.3.email`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub violations: BTreeSet<String>,
}

impl Outcome {
    pub fn valid() -> Self {
        Outcome {
            valid: true,
            violations: BTreeSet::new(),
        }
    }

    pub fn invalid<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Outcome {
            valid: false,
            violations: violations.into_iter().map(Into::into).collect(),
        }
    }

    /// Valid exactly when no violation was collected.
    pub fn from_violations(violations: BTreeSet<String>) -> Self {
        Outcome {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// True if `field` or anything below it was reported.
    pub fn covers(&self, field: &str) -> bool {
        self.violations.iter().any(|v| {
            v == field
                || (v.len() > field.len()
                    && v.starts_with(field)
                    && v.as_bytes()[field.len()] == b'.')
        })
    }
}

/// A schema compiled by one engine, ready for repeated timed calls.
pub trait CompiledValidator: Send + Sync {
    /// Validate one payload. Must not mutate observable state: two calls on
    /// the same payload return the same outcome.
    fn validate(&self, payload: &Value) -> Outcome;
}

/// Constraint primitives an engine can express, plus the semantics that
/// explain where engines legitimately disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub length_bounds: bool,
    pub numeric_minimum: bool,
    pub integer_only: bool,
    pub formats: Vec<Format>,
    /// A schema may reach itself through nested objects or array items.
    pub self_reference: bool,
    /// Array elements may themselves be constrained objects or arrays.
    pub nested_items: bool,
    /// Validators are built from schemas at run time. When false the engine
    /// only knows models compiled into the harness.
    pub runtime_schemas: bool,
    /// `null` on an optional field is accepted as if the field were absent.
    pub null_as_absent: bool,
}

impl Capabilities {
    /// Every primitive of the constraint model, with JSON Schema's reading
    /// of `null` (a typed field never accepts it).
    pub fn full() -> Self {
        Capabilities {
            length_bounds: true,
            numeric_minimum: true,
            integer_only: true,
            formats: vec![Format::Email, Format::Uri],
            self_reference: true,
            nested_items: true,
            runtime_schemas: true,
            null_as_absent: false,
        }
    }

    /// Fail fast with `SchemaTranslation` if any schema reachable from
    /// `root` uses a primitive this engine lacks.
    pub fn ensure_expressible(
        &self,
        engine: &str,
        root: &ObjectSchema,
        catalog: &SchemaCatalog,
    ) -> BenchResult<()> {
        let closure = catalog.closure(root.id())?;
        for schema in &closure {
            for field in schema.fields() {
                if let Some(reason) = self.unsupported(field) {
                    return Err(BenchError::SchemaTranslation {
                        engine: engine.to_string(),
                        schema: root.id().to_string(),
                        reason: format!("{}.{}: {reason}", schema.id(), field.name),
                    });
                }
            }
        }
        if !self.self_reference {
            for schema in &closure {
                let reachable = catalog.closure(schema.id())?;
                if reachable
                    .iter()
                    .any(|c| c.references().any(|r| r.id() == schema.id()))
                {
                    return Err(BenchError::SchemaTranslation {
                        engine: engine.to_string(),
                        schema: root.id().to_string(),
                        reason: format!("{} references itself", schema.id()),
                    });
                }
            }
        }
        Ok(())
    }

    fn unsupported(&self, field: &FieldConstraint) -> Option<String> {
        if !self.length_bounds && (field.min_length.is_some() || field.max_length.is_some()) {
            return Some("no length bound primitive".to_string());
        }
        if !self.numeric_minimum && field.min.is_some() {
            return Some("no numeric lower bound primitive".to_string());
        }
        if !self.integer_only && field.integer_only {
            return Some("no integer primitive".to_string());
        }
        if let Some(format) = field.format {
            if !self.formats.contains(&format) {
                return Some(format!("no '{}' format", format.as_str()));
            }
        }
        if let Some(ItemConstraint::Field(item)) = &field.items {
            if !self.nested_items && matches!(item.kind, FieldKind::Object | FieldKind::Array) {
                return Some(format!("no constrained {} elements", item.kind.as_str()));
            }
            return self.unsupported(item);
        }
        None
    }
}

/// One validation engine behind the uniform benchmark contract.
pub trait EngineAdapter: Send + Sync {
    /// Unique engine id (e.g. "jsonschema", "boon").
    fn engine_id(&self) -> &str;

    /// Engine version, if known.
    fn version(&self) -> Option<String>;

    fn capabilities(&self) -> Capabilities;

    /// Translate `schema` into the engine's native form and compile it.
    ///
    /// Called once per schema per suite run, outside any timed region.
    /// Fails with `BenchError::SchemaTranslation` when the engine cannot
    /// express a constraint.
    fn compile(
        &self,
        schema: &ObjectSchema,
        catalog: &SchemaCatalog,
    ) -> BenchResult<Arc<dyn CompiledValidator>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SchemaRef, define_schema};

    #[test]
    fn test_outcome_covers_descendants() {
        let outcome = Outcome::invalid(["bestFriend.age", "otherFriends.3.email"]);
        assert!(outcome.covers("bestFriend.age"));
        assert!(outcome.covers("bestFriend"));
        assert!(outcome.covers("otherFriends.3"));
        assert!(!outcome.covers("best"));
        assert!(!outcome.covers("age"));
    }

    #[test]
    fn test_outcome_from_empty_violations_is_valid() {
        assert_eq!(Outcome::from_violations(BTreeSet::new()), Outcome::valid());
    }

    #[test]
    fn test_missing_format_fails_translation() {
        let mut catalog = SchemaCatalog::new();
        let schema = define_schema(
            "site",
            vec![FieldConstraint::string("home").format(Format::Uri)],
        )
        .unwrap();
        catalog.insert(schema.clone()).unwrap();

        let caps = Capabilities {
            formats: vec![Format::Email],
            ..Capabilities::full()
        };
        let err = caps.ensure_expressible("limited", &schema, &catalog).unwrap_err();
        match err {
            BenchError::SchemaTranslation { engine, schema, reason } => {
                assert_eq!(engine, "limited");
                assert_eq!(schema, "site");
                assert!(reason.contains("uri"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_nested_schema_is_found() {
        let mut catalog = SchemaCatalog::new();
        let outer = define_schema(
            "outer",
            vec![FieldConstraint::object("inner", SchemaRef::to("inner"))],
        )
        .unwrap();
        catalog.insert(outer.clone()).unwrap();
        catalog
            .insert(define_schema("inner", vec![FieldConstraint::string("s").length(1, 2)]).unwrap())
            .unwrap();

        let caps = Capabilities {
            length_bounds: false,
            ..Capabilities::full()
        };
        assert!(caps.ensure_expressible("nolen", &outer, &catalog).is_err());
        assert!(Capabilities::full().ensure_expressible("all", &outer, &catalog).is_ok());
    }

    #[test]
    fn test_constrained_object_elements_need_nested_items() {
        let mut catalog = SchemaCatalog::new();
        let team = define_schema(
            "team",
            vec![FieldConstraint::array(
                "members",
                ItemConstraint::Field(Box::new(FieldConstraint::object("m", SchemaRef::to("p")))),
            )],
        )
        .unwrap();
        catalog.insert(team.clone()).unwrap();
        catalog
            .insert(define_schema("p", vec![FieldConstraint::number("age").min(18.0)]).unwrap())
            .unwrap();

        let flat = Capabilities {
            nested_items: false,
            ..Capabilities::full()
        };
        let err = flat.ensure_expressible("flat", &team, &catalog).unwrap_err();
        assert!(err.to_string().contains("no constrained object elements"), "{err}");
        assert!(Capabilities::full().ensure_expressible("all", &team, &catalog).is_ok());
    }

    #[test]
    fn test_self_reference_fails_fast_without_support() {
        let mut catalog = SchemaCatalog::new();
        let person = define_schema(
            "person",
            vec![FieldConstraint::object("bestFriend", SchemaRef::to("person"))],
        )
        .unwrap();
        catalog.insert(person.clone()).unwrap();

        let acyclic = Capabilities {
            self_reference: false,
            ..Capabilities::full()
        };
        let err = acyclic.ensure_expressible("acyclic", &person, &catalog).unwrap_err();
        assert!(matches!(err, BenchError::SchemaTranslation { .. }));
    }
}
