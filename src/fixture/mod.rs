//! Fixture registry: named sample payloads with known expected outcomes.

pub mod builtin;
pub mod registry;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::Outcome;
use crate::model::SchemaId;

pub use builtin::{
    FixtureSpec, Workload, builtin_workloads, friendly_person_schema, person, person_schema, workload_by_name,
    workload_names,
};
pub use registry::FixtureRegistry;

/// What a conformant engine should return for a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expect", rename_all = "snake_case")]
pub enum Expected {
    Valid,
    /// `fields` holds the dotted paths that must be reported; extra
    /// violations are allowed.
    Invalid { fields: BTreeSet<String> },
}

impl Expected {
    pub fn invalid<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expected::Invalid {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Expected::Valid)
    }

    pub fn matches(&self, outcome: &Outcome) -> bool {
        match self {
            Expected::Valid => outcome.valid && outcome.violations.is_empty(),
            Expected::Invalid { fields } => {
                !outcome.valid && fields.iter().all(|f| outcome.covers(f))
            }
        }
    }

    /// Short human form, e.g. `valid` or `invalid {age}`.
    pub fn describe(&self) -> String {
        match self {
            Expected::Valid => "valid".to_string(),
            Expected::Invalid { fields } if fields.is_empty() => "invalid".to_string(),
            Expected::Invalid { fields } => {
                let list: Vec<&str> = fields.iter().map(String::as_str).collect();
                format!("invalid {{{}}}", list.join(", "))
            }
        }
    }
}

/// An immutable payload registered against one schema.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    pub schema: SchemaId,
    pub id: String,
    pub payload: Value,
    pub expected: Expected,
    /// SHA-256 of the payload's JSON serialization.
    pub sha256: String,
}

impl Fixture {
    pub(crate) fn new(schema: SchemaId, id: String, payload: Value, expected: Expected) -> Self {
        let sha256 = crate::sha256_hex(payload.to_string().as_bytes());
        Fixture {
            schema,
            id,
            payload,
            expected,
            sha256,
        }
    }

    /// `schema/id`, unique within a registry.
    pub fn key(&self) -> String {
        format!("{}/{}", self.schema, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_requires_no_violations() {
        assert!(Expected::Valid.matches(&Outcome::valid()));
        assert!(!Expected::Valid.matches(&Outcome::invalid(["age"])));
        let inconsistent = Outcome {
            valid: true,
            violations: ["age".to_string()].into_iter().collect(),
        };
        assert!(!Expected::Valid.matches(&inconsistent));
    }

    #[test]
    fn test_invalid_allows_extra_detail() {
        let expected = Expected::invalid(["bestFriend.age"]);
        assert!(expected.matches(&Outcome::invalid(["bestFriend.age", "name"])));
        assert!(expected.matches(&Outcome::invalid(["bestFriend.age.value"])));
        assert!(!expected.matches(&Outcome::invalid(["bestFriend"])));
        assert!(!expected.matches(&Outcome::valid()));
    }

    #[test]
    fn test_fixture_fingerprint_is_stable() {
        let a = Fixture::new("s".into(), "a".into(), json!({"x": 1}), Expected::Valid);
        let b = Fixture::new("s".into(), "b".into(), json!({"x": 1}), Expected::Valid);
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(a.sha256.len(), 64);
        assert_eq!(a.key(), "s/a");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Expected::Valid.describe(), "valid");
        assert_eq!(Expected::invalid(["b", "a"]).describe(), "invalid {a, b}");
    }
}
