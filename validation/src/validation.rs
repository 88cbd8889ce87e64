use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::trace;
use uuid::Uuid;

use crate::{FieldConstraint, FieldFormat, Schema};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Kind of a single rule violation, with the numbers that triggered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    RequiredMissing,
    TypeMismatch { expected: FieldFormat },
    ExactLength { expected: usize, actual: usize },
    MinLength { min: usize, actual: usize },
    MaxLength { max: usize, actual: usize },
    RegexMismatch,
}

/// One field-level violation found by the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFailure {
    pub field: String,
    pub kind: FailureKind,
}

impl RawFailure {
    pub fn new(field: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Schema validator for raw JSON input
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate `input` against `schema`.
    ///
    /// Yields at most one failure per field, lazily and in declaration
    /// order. Input that is not an object is treated as an empty object.
    pub fn validate<'a>(
        schema: &'a Schema,
        input: &'a JsonValue,
    ) -> impl Iterator<Item = RawFailure> + 'a {
        schema.fields().filter_map(move |(key, constraint)| {
            let value = input.as_object().and_then(|object| object.get(key));
            Self::check_field(constraint, value).map(|kind| {
                trace!("Field '{}' failed validation: {:?}", key, kind);
                RawFailure::new(key, kind)
            })
        })
    }

    /// Run the checks for one field: presence, type, exact length,
    /// min/max length, then pattern. Returns the first failure.
    pub fn check_field(
        constraint: &FieldConstraint,
        value: Option<&JsonValue>,
    ) -> Option<FailureKind> {
        // Absent and null values only fail required fields
        let value = match value {
            None | Some(JsonValue::Null) => {
                return (!constraint.optional).then_some(FailureKind::RequiredMissing);
            }
            Some(value) => value,
        };

        // Empty strings always report as missing; optional fields are
        // exempted later by the normalizer
        if value.as_str().is_some_and(str::is_empty) {
            return Some(FailureKind::RequiredMissing);
        }

        if !Self::matches_format(constraint.format, value) {
            return Some(FailureKind::TypeMismatch {
                expected: constraint.format,
            });
        }

        if constraint.format.has_length() {
            if let Some(actual) = Self::measure(value) {
                if let Some(kind) = Self::check_length(constraint, actual) {
                    return Some(kind);
                }
            }
        }

        if let (Some(pattern), Some(text)) = (&constraint.pattern, value.as_str()) {
            if !pattern.is_match(text) {
                return Some(FailureKind::RegexMismatch);
            }
        }

        None
    }

    fn matches_format(format: FieldFormat, value: &JsonValue) -> bool {
        match format {
            FieldFormat::Text => value.is_string(),
            FieldFormat::Email => value.as_str().is_some_and(|s| EMAIL_PATTERN.is_match(s)),
            FieldFormat::Uuid => value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
            FieldFormat::Integer => value.is_i64(),
            FieldFormat::Boolean => value.is_boolean(),
            FieldFormat::List => value.is_array(),
        }
    }

    /// Characters for strings, elements for lists
    fn measure(value: &JsonValue) -> Option<usize> {
        match value {
            JsonValue::String(s) => Some(s.chars().count()),
            JsonValue::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    fn check_length(constraint: &FieldConstraint, actual: usize) -> Option<FailureKind> {
        if let Some(expected) = constraint.exact_length {
            if actual != expected {
                return Some(FailureKind::ExactLength { expected, actual });
            }
        }

        if let Some(min) = constraint.min_length {
            if actual < min {
                return Some(FailureKind::MinLength { min, actual });
            }
        }

        if let Some(max) = constraint.max_length {
            if actual > max {
                return Some(FailureKind::MaxLength { max, actual });
            }
        }

        None
    }
}
