//! Constraint model to JSON Schema (draft 2020-12) translation, shared by
//! the JSON Schema engines.
//!
//! Every schema in the root's closure becomes an entry under `$defs`;
//! object references turn into `$ref` pointers, so self reference stays a
//! pointer and never an expanded copy.

use serde_json::{Map, Value, json};

use crate::BenchResult;
use crate::model::{FieldConstraint, FieldKind, ItemConstraint, ObjectSchema, SchemaCatalog, SchemaRef};

pub const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

pub fn translate(schema: &ObjectSchema, catalog: &SchemaCatalog) -> BenchResult<Value> {
    let mut defs = Map::new();
    for member in catalog.closure(schema.id())? {
        defs.insert(member.id().to_string(), object_schema(member));
    }
    Ok(json!({
        "$schema": DRAFT,
        "$ref": pointer(&SchemaRef::to(schema.id())),
        "$defs": defs,
    }))
}

fn pointer(reference: &SchemaRef) -> String {
    format!("#/$defs/{}", reference.id())
}

fn object_schema(schema: &ObjectSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in schema.fields() {
        properties.insert(field.name.clone(), field_schema(field));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(field: &FieldConstraint) -> Value {
    let mut out = Map::new();
    match field.kind {
        FieldKind::String => {
            out.insert("type".into(), json!("string"));
            if let Some(n) = field.min_length {
                out.insert("minLength".into(), json!(n));
            }
            if let Some(n) = field.max_length {
                out.insert("maxLength".into(), json!(n));
            }
            if let Some(format) = field.format {
                out.insert("format".into(), json!(format.as_str()));
            }
        }
        FieldKind::Number => {
            let ty = if field.integer_only { "integer" } else { "number" };
            out.insert("type".into(), json!(ty));
            if let Some(min) = field.min {
                out.insert("minimum".into(), json!(min));
            }
        }
        FieldKind::Boolean => {
            out.insert("type".into(), json!("boolean"));
        }
        FieldKind::Object => match &field.nested {
            Some(reference) => {
                out.insert("$ref".into(), json!(pointer(reference)));
            }
            None => {
                out.insert("type".into(), json!("object"));
            }
        },
        FieldKind::Array => {
            out.insert("type".into(), json!("array"));
            match &field.items {
                Some(ItemConstraint::Schema(reference)) => {
                    out.insert("items".into(), json!({ "$ref": pointer(reference) }));
                }
                Some(ItemConstraint::Field(item)) => {
                    out.insert("items".into(), field_schema(item));
                }
                None => {}
            }
        }
    }
    Value::Object(out)
}
