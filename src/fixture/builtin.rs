//! Built-in workloads: a flat person record and a self-referential one.

use serde_json::{Value, json};

use super::Expected;
use crate::BenchResult;
use crate::model::{FieldConstraint, Format, ItemConstraint, ObjectSchema, SchemaId, SchemaRef, define_schema};

pub const SIMPLE: &str = "simple";
pub const COMPLEX: &str = "complex";

/// A fixture before registration.
#[derive(Debug, Clone)]
pub struct FixtureSpec {
    pub schema: SchemaId,
    pub id: String,
    pub payload: Value,
    pub expected: Expected,
}

/// Schemas plus the fixtures that exercise them.
#[derive(Debug, Clone)]
pub struct Workload {
    pub name: &'static str,
    pub description: &'static str,
    pub schemas: Vec<ObjectSchema>,
    pub fixtures: Vec<FixtureSpec>,
}

impl Workload {
    fn fixture(&mut self, schema: &str, id: &str, payload: Value, expected: Expected) {
        self.fixtures.push(FixtureSpec {
            schema: SchemaId::new(schema),
            id: id.to_string(),
            payload,
            expected,
        });
    }
}

pub fn builtin_workloads() -> BenchResult<Vec<Workload>> {
    Ok(vec![simple()?, complex()?])
}

pub fn workload_by_name(name: &str) -> BenchResult<Option<Workload>> {
    match name {
        SIMPLE => simple().map(Some),
        COMPLEX => complex().map(Some),
        _ => Ok(None),
    }
}

pub fn workload_names() -> [&'static str; 2] {
    [SIMPLE, COMPLEX]
}

fn person_fields() -> Vec<FieldConstraint> {
    vec![
        FieldConstraint::string("name").length(4, 25).required(),
        FieldConstraint::string("email").format(Format::Email).required(),
        FieldConstraint::string("company"),
        FieldConstraint::string("phone").required(),
        FieldConstraint::number("age").integer().min(18.0).required(),
    ]
}

/// Schema of the flat `simple` workload.
pub fn person_schema() -> BenchResult<ObjectSchema> {
    define_schema("person", person_fields())
}

/// Schema of the `complex` workload: a person whose friends are people of
/// the same shape.
pub fn friendly_person_schema() -> BenchResult<ObjectSchema> {
    let mut fields = person_fields();
    fields.push(FieldConstraint::object("bestFriend", SchemaRef::to("friendly_person")));
    fields.push(FieldConstraint::array(
        "otherFriends",
        ItemConstraint::Schema(SchemaRef::to("friendly_person")),
    ));
    define_schema("friendly_person", fields)
}

/// The sample person every workload starts from.
pub fn person() -> Value {
    json!({
        "name": "Cyril Urban",
        "email": "cyril.urban@random.com",
        "company": "Qest",
        "phone": "731123456",
        "age": 25
    })
}

fn with(mut value: Value, key: &str, field: Value) -> Value {
    if let Some(map) = value.as_object_mut() {
        map.insert(key.to_string(), field);
    }
    value
}

fn without(mut value: Value, key: &str) -> Value {
    if let Some(map) = value.as_object_mut() {
        map.remove(key);
    }
    value
}

fn simple() -> BenchResult<Workload> {
    let schema = person_schema()?;
    let mut w = Workload {
        name: SIMPLE,
        description: "flat person record",
        schemas: vec![schema],
        fixtures: Vec::new(),
    };

    w.fixture("person", "valid", person(), Expected::Valid);
    w.fixture("person", "no_company", without(person(), "company"), Expected::Valid);
    w.fixture(
        "person",
        "underage",
        with(person(), "age", json!(17)),
        Expected::invalid(["age"]),
    );
    w.fixture(
        "person",
        "short_name",
        with(person(), "name", json!("Cyr")),
        Expected::invalid(["name"]),
    );
    w.fixture(
        "person",
        "bad_email",
        with(person(), "email", json!("cyril.urban.random.com")),
        Expected::invalid(["email"]),
    );
    w.fixture(
        "person",
        "missing_phone",
        without(person(), "phone"),
        Expected::invalid(["phone"]),
    );
    w.fixture(
        "person",
        "fractional_age",
        with(person(), "age", json!(25.5)),
        Expected::invalid(["age"]),
    );
    Ok(w)
}

fn complex() -> BenchResult<Workload> {
    let schema = friendly_person_schema()?;

    let friends = || json!([person(), person(), person(), person(), person()]);
    let complex_person = with(
        with(person(), "bestFriend", person()),
        "otherFriends",
        friends(),
    );

    let mut w = Workload {
        name: COMPLEX,
        description: "person with a best friend and five other friends of the same shape",
        schemas: vec![schema],
        fixtures: Vec::new(),
    };

    w.fixture("friendly_person", "valid", complex_person.clone(), Expected::Valid);
    w.fixture(
        "friendly_person",
        "underage_best_friend",
        with(
            complex_person.clone(),
            "bestFriend",
            with(person(), "age", json!(17)),
        ),
        Expected::invalid(["bestFriend.age"]),
    );

    let mut others = friends();
    others[3] = with(person(), "email", json!("not-an-email"));
    w.fixture(
        "friendly_person",
        "bad_friend_email",
        with(complex_person.clone(), "otherFriends", others),
        Expected::invalid(["otherFriends.3.email"]),
    );

    let young = with(person(), "age", json!(10));
    w.fixture(
        "friendly_person",
        "deep_friend_chain",
        with(
            complex_person,
            "bestFriend",
            with(person(), "bestFriend", young),
        ),
        Expected::invalid(["bestFriend.bestFriend.age"]),
    );
    Ok(w)
}
