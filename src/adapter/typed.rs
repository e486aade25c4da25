//! Adapter for the `validator` crate: derive-based validation of typed
//! models.
//!
//! `validator` checks Rust structs, not documents, so it cannot build a
//! validator from an arbitrary schema at run time. The adapter carries one
//! compiled-in model per built-in schema and matches incoming schemas
//! against them field by field. Anything else fails translation.
//!
//! A payload is decoded with `serde_path_to_error` first; a type error
//! (for example `25.5` for an integer) is reported at the decoder's path.
//! Every field is an `Option`, so `null` and absent both decode to `None`.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;
use tracing::debug;
use validator::Validate;

use super::path;
use super::traits::{Capabilities, CompiledValidator, EngineAdapter, Outcome};
use crate::fixture::{friendly_person_schema, person_schema};
use crate::model::{Format, ObjectSchema, SchemaCatalog};
use crate::{BenchError, BenchResult};

pub const ENGINE_ID: &str = "validator";
const ENGINE_VERSION: &str = "0.18";

#[derive(Debug, Deserialize, Validate)]
struct Person {
    #[validate(required, length(min = 4, max = 25))]
    name: Option<String>,
    #[validate(required, email)]
    email: Option<String>,
    #[allow(dead_code)]
    company: Option<String>,
    #[validate(required)]
    phone: Option<String>,
    #[validate(required, range(min = 18))]
    age: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
struct FriendlyPerson {
    #[validate(required, length(min = 4, max = 25))]
    name: Option<String>,
    #[validate(required, email)]
    email: Option<String>,
    #[allow(dead_code)]
    company: Option<String>,
    #[validate(required)]
    phone: Option<String>,
    #[validate(required, range(min = 18))]
    age: Option<i64>,
    #[serde(rename = "bestFriend")]
    best_friend: Option<Box<FriendlyPerson>>,
    #[serde(rename = "otherFriends")]
    other_friends: Option<Vec<FriendlyPerson>>,
}

/// A decoded model plus the nested models it holds, keyed by the path
/// segment they sit under.
trait Model: DeserializeOwned + Validate + Send + Sync + 'static {
    fn children(&self) -> Vec<(String, &Self)>;
}

impl Model for Person {
    fn children(&self) -> Vec<(String, &Self)> {
        Vec::new()
    }
}

impl Model for FriendlyPerson {
    fn children(&self) -> Vec<(String, &Self)> {
        let mut out = Vec::new();
        if let Some(friend) = &self.best_friend {
            out.push(("bestFriend".to_string(), friend.as_ref()));
        }
        if let Some(friends) = &self.other_friends {
            for (i, friend) in friends.iter().enumerate() {
                out.push((format!("otherFriends.{i}"), friend));
            }
        }
        out
    }
}

#[derive(Debug, Default, Clone)]
pub struct TypedAdapter;

impl TypedAdapter {
    pub fn new() -> Self {
        TypedAdapter
    }
}

impl EngineAdapter for TypedAdapter {
    fn engine_id(&self) -> &str {
        ENGINE_ID
    }

    fn version(&self) -> Option<String> {
        Some(ENGINE_VERSION.to_string())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            formats: vec![Format::Email],
            runtime_schemas: false,
            null_as_absent: true,
            ..Capabilities::full()
        }
    }

    fn compile(
        &self,
        schema: &ObjectSchema,
        catalog: &SchemaCatalog,
    ) -> BenchResult<Arc<dyn CompiledValidator>> {
        self.capabilities()
            .ensure_expressible(ENGINE_ID, schema, catalog)?;
        if schema.fields() == person_schema()?.fields() {
            debug!(schema = %schema.id(), model = "Person", "matched compiled-in model");
            return Ok(Arc::new(CompiledModel::<Person>::new()));
        }
        if schema.fields() == friendly_person_schema()?.fields() {
            debug!(schema = %schema.id(), model = "FriendlyPerson", "matched compiled-in model");
            return Ok(Arc::new(CompiledModel::<FriendlyPerson>::new()));
        }
        Err(BenchError::SchemaTranslation {
            engine: ENGINE_ID.to_string(),
            schema: schema.id().to_string(),
            reason: "no compiled-in model has these fields".to_string(),
        })
    }
}

struct CompiledModel<M> {
    model: PhantomData<fn() -> M>,
}

impl<M> CompiledModel<M> {
    fn new() -> Self {
        CompiledModel { model: PhantomData }
    }
}

impl<M: Model> CompiledValidator for CompiledModel<M> {
    fn validate(&self, payload: &Value) -> Outcome {
        match serde_path_to_error::deserialize::<_, M>(payload) {
            Ok(model) => {
                let mut violations = BTreeSet::new();
                check(&model, "", &mut violations);
                Outcome::from_violations(violations)
            }
            Err(err) => Outcome::invalid([decode_path(err.path())]),
        }
    }
}

fn check<M: Model>(model: &M, prefix: &str, out: &mut BTreeSet<String>) {
    if let Err(errors) = model.validate() {
        for field in errors.field_errors().keys() {
            out.insert(path::join(prefix, field));
        }
    }
    for (segment, child) in model.children() {
        check(child, &path::join(prefix, &segment), out);
    }
}

fn decode_path(at: &serde_path_to_error::Path) -> String {
    path::from_segments(at.iter().map(|segment| match segment {
        Segment::Seq { index } => index.to_string(),
        Segment::Map { key } => key.clone(),
        _ => "?".to_string(),
    }))
}
