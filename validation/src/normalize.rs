use serde_json::Value as JsonValue;
use tracing::debug;

use crate::{
    ErrorName, FailureKind, FieldFormat, NormalizedError, RawFailure, Schema, SchemaValidator,
};

/// Pick the one failure worth reporting and shape it into a domain error.
///
/// Failures are scanned in order. A failure on a required field is taken
/// as is; a failure on an optional field is taken unless the field is
/// merely missing or empty. The first taken failure decides the result,
/// and `None` means the input is accepted.
pub fn normalize<I>(schema: &Schema, failures: I) -> Option<NormalizedError>
where
    I: IntoIterator<Item = RawFailure>,
{
    let selected = failures.into_iter().find(|failure| {
        !(schema.is_optional(&failure.field) && failure.kind == FailureKind::RequiredMissing)
    })?;

    debug!(
        "Reporting validation failure on '{}': {:?}",
        selected.field, selected.kind
    );

    Some(shape(schema, &selected))
}

/// Validate and normalize in one step
pub fn validate_schema(schema: &Schema, input: &JsonValue) -> Option<NormalizedError> {
    normalize(schema, SchemaValidator::validate(schema, input))
}

fn shape(schema: &Schema, failure: &RawFailure) -> NormalizedError {
    let key = failure.field.as_str();

    // A failure for a field the schema never declared cannot be described
    let Some(constraint) = schema.get(key) else {
        return NormalizedError::new(ErrorName::Unknown);
    };

    match &failure.kind {
        FailureKind::RequiredMissing => NormalizedError::new(ErrorName::Required)
            .with_params([key])
            .for_field(key),

        FailureKind::ExactLength { expected, .. } => NormalizedError::new(ErrorName::LengthExact)
            .with_params([key.to_string(), expected.to_string()])
            .for_field(key)
            .with_extra("length", *expected),

        FailureKind::MinLength { .. } | FailureKind::MaxLength { .. } => {
            let min = constraint.min_length.unwrap_or(0);
            let max = constraint.max_length;

            let err = NormalizedError::new(ErrorName::Length)
                .with_params([
                    key.to_string(),
                    min.to_string(),
                    max.map(|m| m.to_string())
                        .unwrap_or_else(|| "unlimited".to_string()),
                ])
                .for_field(key)
                .with_extra("min", min);

            match max {
                Some(max) => err.with_extra("max", max),
                None => err,
            }
        }

        FailureKind::TypeMismatch { expected } => match expected {
            FieldFormat::Email => NormalizedError::new(ErrorName::RequiredEmail).for_field(key),
            FieldFormat::Uuid => NormalizedError::new(ErrorName::RequiredUuid).for_field(key),
            FieldFormat::Text | FieldFormat::Integer | FieldFormat::Boolean | FieldFormat::List => {
                NormalizedError::new(ErrorName::Unknown)
            }
        },

        FailureKind::RegexMismatch => NormalizedError::new(ErrorName::InvalidRegex)
            .with_params([key])
            .for_field(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldConstraint;
    use regex::Regex;
    use serde_json::json;

    fn community_schema() -> Schema {
        Schema::new()
            .field("name", FieldConstraint::text().length_between(3, 16))
            .field(
                "description",
                FieldConstraint::text().length_between(5, 50).optional(),
            )
    }

    #[test]
    fn test_short_name_reports_length() {
        let err = validate_schema(&community_schema(), &json!({"name": "ab", "description": ""}))
            .expect("name is too short");

        assert_eq!(err.name, ErrorName::Length);
        assert_eq!(err.code, ErrorName::Length.code());
        assert_eq!(err.message, "name must be between 3 and 16 characters.");
        assert_eq!(
            serde_json::to_value(&err.extras).unwrap(),
            json!({"for": "name", "min": 3, "max": 16})
        );
    }

    #[test]
    fn test_empty_optional_is_exempt() {
        assert!(
            validate_schema(&community_schema(), &json!({"name": "abc", "description": ""}))
                .is_none()
        );
        assert!(validate_schema(&community_schema(), &json!({"name": "abc"})).is_none());
    }

    #[test]
    fn test_present_optional_still_validated() {
        let err = validate_schema(&community_schema(), &json!({"name": "abc", "description": "x"}))
            .expect("description is too short");

        assert_eq!(err.name, ErrorName::Length);
        assert_eq!(
            serde_json::to_value(&err.extras).unwrap(),
            json!({"for": "description", "min": 5, "max": 50})
        );
    }

    #[test]
    fn test_optional_regex_mismatch() {
        let https = Regex::new(r"^https://").unwrap();
        let schema = Schema::new().field("icon", FieldConstraint::text().matching(&https).optional());

        let err = validate_schema(&schema, &json!({"icon": "http://x"})).unwrap();
        assert_eq!(err.name, ErrorName::InvalidRegex);
        assert_eq!(err.field(), Some("icon"));
        assert_eq!(err.message, "icon is not in the correct format.");
    }

    #[test]
    fn test_first_required_missing_wins() {
        let schema = Schema::new()
            .field("email", FieldConstraint::email())
            .field("password", FieldConstraint::text().length_between(8, 90));

        let err = validate_schema(&schema, &json!({"password": "short"})).unwrap();
        assert_eq!(err.name, ErrorName::Required);
        assert_eq!(err.field(), Some("email"));
        assert_eq!(err.message, "email is required.");
    }

    #[test]
    fn test_optional_empty_skipped_for_later_failure() {
        let schema = Schema::new()
            .field("bio", FieldConstraint::text().max_length(5).optional())
            .field("username", FieldConstraint::text().length_between(5, 30));

        let err = validate_schema(&schema, &json!({"bio": "", "username": "abc"})).unwrap();
        assert_eq!(err.field(), Some("username"));
    }

    #[test]
    fn test_exact_length() {
        let schema = Schema::new().field("invite", FieldConstraint::text().exact_length(8));

        let err = validate_schema(&schema, &json!({"invite": "abc"})).unwrap();
        assert_eq!(err.name, ErrorName::LengthExact);
        assert_eq!(err.message, "invite must be exactly 8 characters.");
        assert_eq!(
            serde_json::to_value(&err.extras).unwrap(),
            json!({"for": "invite", "length": 8})
        );
    }

    #[test]
    fn test_type_mismatch_mapping() {
        let schema = Schema::new()
            .field("email", FieldConstraint::email().optional())
            .field("reply_id", FieldConstraint::uuid().optional())
            .field("status", FieldConstraint::integer().optional());

        let err = validate_schema(&schema, &json!({"email": "nope"})).unwrap();
        assert_eq!(err.name, ErrorName::RequiredEmail);
        assert_eq!(err.field(), Some("email"));

        let err = validate_schema(&schema, &json!({"reply_id": "nope"})).unwrap();
        assert_eq!(err.name, ErrorName::RequiredUuid);

        let err = validate_schema(&schema, &json!({"status": "nope"})).unwrap();
        assert_eq!(err.name, ErrorName::Unknown);
        assert!(err.extras.is_none());
    }

    #[test]
    fn test_undeclared_field_degrades_to_unknown() {
        let schema = Schema::new().field("name", FieldConstraint::text());
        let failures = vec![RawFailure::new("ghost", FailureKind::RegexMismatch)];

        let err = normalize(&schema, failures).unwrap();
        assert_eq!(err.name, ErrorName::Unknown);
        assert!(err.extras.is_none());
    }

    #[test]
    fn test_no_failures() {
        let schema = Schema::new();
        assert!(normalize(&schema, Vec::new()).is_none());
    }

    #[test]
    fn test_length_without_max() {
        let schema = Schema::new().field("content", FieldConstraint::text().min_length(10));

        let err = validate_schema(&schema, &json!({"content": "short"})).unwrap();
        assert_eq!(err.message, "content must be between 10 and unlimited characters.");
        assert_eq!(
            serde_json::to_value(&err.extras).unwrap(),
            json!({"for": "content", "min": 10})
        );
    }
}
