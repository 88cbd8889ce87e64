use proptest::prelude::*;
use serde_json::{json, Map, Value as JsonValue};
use validation::{validate_schema, ErrorName, FieldConstraint, Schema};

fn server_schema() -> Schema {
    let https = regex::Regex::new(r"^https://.+$").unwrap();
    Schema::new()
        .field("name", FieldConstraint::text().length_between(3, 16))
        .field(
            "description",
            FieldConstraint::text().length_between(5, 50).optional(),
        )
        .field(
            "icon",
            FieldConstraint::text().max_length(512).matching(&https).optional(),
        )
}

fn arb_field_value() -> impl Strategy<Value = Option<JsonValue>> {
    prop_oneof![
        Just(None),
        Just(Some(JsonValue::Null)),
        Just(Some(json!(""))),
        "[a-z:/.]{0,60}".prop_map(|s| Some(json!(s))),
        any::<i64>().prop_map(|n| Some(json!(n))),
        any::<bool>().prop_map(|b| Some(json!(b))),
    ]
}

fn arb_input() -> impl Strategy<Value = JsonValue> {
    (arb_field_value(), arb_field_value(), arb_field_value()).prop_map(|(name, description, icon)| {
        let mut object = Map::new();
        for (key, value) in [("name", name), ("description", description), ("icon", icon)] {
            if let Some(value) = value {
                object.insert(key.to_string(), value);
            }
        }
        JsonValue::Object(object)
    })
}

proptest! {
    #[test]
    fn normalize_is_deterministic(input in arb_input()) {
        let schema = server_schema();
        let first = validate_schema(&schema, &input);
        let second = validate_schema(&schema, &input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn optional_fields_never_report_required(input in arb_input()) {
        let schema = server_schema();
        if let Some(err) = validate_schema(&schema, &input) {
            if err.name == ErrorName::Required {
                prop_assert_eq!(err.field(), Some("name"));
            }
        }
    }

    #[test]
    fn valid_names_with_absent_optionals_pass(name in "[a-z]{3,16}") {
        let schema = server_schema();
        let input = json!({"name": name});
        prop_assert!(validate_schema(&schema, &input).is_none());
    }

    #[test]
    fn code_lookup_round_trips(index in 0usize..ErrorName::ALL.len()) {
        let name = ErrorName::ALL[index];
        prop_assert_eq!(ErrorName::from_code(name.code()), Ok(name));
    }
}

#[test]
fn codes_are_strictly_increasing_from_one() {
    let codes: Vec<u16> = ErrorName::ALL.iter().map(|name| name.code()).collect();
    let expected: Vec<u16> = (1..=ErrorName::ALL.len() as u16).collect();
    assert_eq!(codes, expected);
}

#[test]
fn missing_required_reported_before_later_fields() {
    let schema = server_schema();
    let err = validate_schema(&schema, &json!({"description": "x", "icon": "http://x"})).unwrap();
    assert_eq!(err.name, ErrorName::Required);
    assert_eq!(err.field(), Some("name"));
}
