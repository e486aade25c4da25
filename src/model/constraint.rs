//! Field-level constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        }
    }
}

/// String formats an engine may be asked to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
    Uri,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Uri => "uri",
        }
    }
}

/// Identifier of an `ObjectSchema` inside a `SchemaCatalog`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        SchemaId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(s: &str) -> Self {
        SchemaId::new(s)
    }
}

impl From<String> for SchemaId {
    fn from(s: String) -> Self {
        SchemaId(s)
    }
}

impl From<&SchemaId> for SchemaId {
    fn from(id: &SchemaId) -> Self {
        id.clone()
    }
}

/// Late-bound reference to a schema, resolved through the catalog when an
/// adapter compiles. Holding only the id is what makes self reference legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRef(SchemaId);

impl SchemaRef {
    pub fn to(id: impl Into<SchemaId>) -> Self {
        SchemaRef(id.into())
    }

    pub fn id(&self) -> &SchemaId {
        &self.0
    }
}

/// Constraint applied to every element of an array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemConstraint {
    /// Each element is an object of the referenced schema.
    Schema(SchemaRef),
    /// Each element is a value described by a field constraint. The field
    /// name is ignored and `required` has no meaning for elements.
    Field(Box<FieldConstraint>),
}

/// One validated field of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default)]
    pub integer_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<SchemaRef>,
}

impl FieldConstraint {
    /// Unconstrained optional field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldConstraint {
            name: name.into(),
            kind,
            required: false,
            min_length: None,
            max_length: None,
            min: None,
            integer_only: false,
            format: None,
            items: None,
            nested: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn object(name: impl Into<String>, schema: SchemaRef) -> Self {
        let mut field = Self::new(name, FieldKind::Object);
        field.nested = Some(schema);
        field
    }

    pub fn array(name: impl Into<String>, items: ItemConstraint) -> Self {
        let mut field = Self::new(name, FieldKind::Array);
        field.items = Some(items);
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    pub fn min(mut self, value: f64) -> Self {
        self.min = Some(value);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer_only = true;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Schemas this field points at, including through array items.
    pub fn schema_refs(&self) -> Vec<&SchemaRef> {
        let mut refs = Vec::new();
        if let Some(nested) = &self.nested {
            refs.push(nested);
        }
        match &self.items {
            Some(ItemConstraint::Schema(r)) => refs.push(r),
            Some(ItemConstraint::Field(f)) => refs.extend(f.schema_refs()),
            None => {}
        }
        refs
    }

    /// Check that only the attributes valid for `kind` are set.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        let is_string = self.kind == FieldKind::String;
        let is_number = self.kind == FieldKind::Number;

        if !is_string && (self.min_length.is_some() || self.max_length.is_some()) {
            return Err(format!("length bounds on a {} field", self.kind.as_str()));
        }
        if !is_string && self.format.is_some() {
            return Err(format!("format on a {} field", self.kind.as_str()));
        }
        if let (Some(lo), Some(hi)) = (self.min_length, self.max_length) {
            if lo > hi {
                return Err(format!("min_length {lo} exceeds max_length {hi}"));
            }
        }
        if !is_number && (self.min.is_some() || self.integer_only) {
            return Err(format!("numeric bound on a {} field", self.kind.as_str()));
        }
        if let Some(min) = self.min {
            if !min.is_finite() {
                return Err("numeric lower bound must be finite".to_string());
            }
        }
        if self.kind != FieldKind::Object && self.nested.is_some() {
            return Err(format!("nested schema on a {} field", self.kind.as_str()));
        }
        if self.kind != FieldKind::Array && self.items.is_some() {
            return Err(format!("item constraint on a {} field", self.kind.as_str()));
        }
        if let Some(ItemConstraint::Field(item)) = &self.items {
            item.check_invariants()
                .map_err(|reason| format!("array items: {reason}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_string_bounds() {
        let f = FieldConstraint::string("name").length(4, 25).required();
        assert_eq!(f.kind, FieldKind::String);
        assert!(f.required);
        assert_eq!(f.min_length, Some(4));
        assert_eq!(f.max_length, Some(25));
        assert!(f.check_invariants().is_ok());
    }

    #[test]
    fn test_length_on_number_is_rejected() {
        let f = FieldConstraint::number("age").min_length(2);
        let err = f.check_invariants().unwrap_err();
        assert!(err.contains("length bounds"));
    }

    #[test]
    fn test_integer_on_string_is_rejected() {
        let f = FieldConstraint::string("age").integer();
        assert!(f.check_invariants().is_err());
    }

    #[test]
    fn test_inverted_length_is_rejected() {
        let f = FieldConstraint::string("name").length(10, 2);
        assert!(f.check_invariants().unwrap_err().contains("exceeds"));
    }

    #[test]
    fn test_item_field_invariants_are_checked() {
        let item = FieldConstraint::number("item").format(Format::Email);
        let f = FieldConstraint::array("scores", ItemConstraint::Field(Box::new(item)));
        assert!(f.check_invariants().unwrap_err().starts_with("array items"));
    }

    #[test]
    fn test_schema_refs_include_items() {
        let f = FieldConstraint::array("friends", ItemConstraint::Schema(SchemaRef::to("person")));
        let refs = f.schema_refs();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id().as_str(), "person");
    }
}
