use regex::Regex;
use serde::{Deserialize, Serialize};

/// Value formats a field can be checked against
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    #[default]
    Text,
    Email,
    Uuid,
    /// Whole number that fits in an i64
    Integer,
    Boolean,
    List,
}

impl FieldFormat {
    /// Whether length constraints apply to values of this format
    pub fn has_length(&self) -> bool {
        matches!(
            self,
            FieldFormat::Text | FieldFormat::Email | FieldFormat::Uuid | FieldFormat::List
        )
    }

    /// Whether the value is a string that regex constraints can run on
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldFormat::Text | FieldFormat::Email | FieldFormat::Uuid)
    }
}

/// Declarative rules for one input field
#[derive(Debug, Clone, Default)]
pub struct FieldConstraint {
    pub format: FieldFormat,
    pub optional: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub exact_length: Option<usize>,
    pub pattern: Option<Regex>,
}

impl FieldConstraint {
    /// A required string field
    pub fn text() -> Self {
        Self::default()
    }

    /// A required field of the given format
    pub fn of(format: FieldFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn email() -> Self {
        Self::of(FieldFormat::Email)
    }

    pub fn uuid() -> Self {
        Self::of(FieldFormat::Uuid)
    }

    pub fn integer() -> Self {
        Self::of(FieldFormat::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(FieldFormat::Boolean)
    }

    pub fn list() -> Self {
        Self::of(FieldFormat::List)
    }

    /// Allow the field to be absent or empty
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set both length bounds
    pub fn length_between(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    pub fn exact_length(mut self, length: usize) -> Self {
        self.exact_length = Some(length);
        self
    }

    /// Require string values to match `pattern`
    pub fn matching(mut self, pattern: &Regex) -> Self {
        self.pattern = Some(pattern.clone());
        self
    }

    /// Required unless marked optional
    pub fn is_required(&self) -> bool {
        !self.optional
    }
}

/// Ordered field rules for one operation's input
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldConstraint)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field; declaration order is validation order.
    ///
    /// Declaring an existing key replaces its constraint in place.
    pub fn field(mut self, key: impl Into<String>, constraint: FieldConstraint) -> Self {
        let key = key.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = constraint,
            None => self.fields.push((key, constraint)),
        }
        self
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldConstraint)> {
        self.fields.iter().map(|(key, c)| (key.as_str(), c))
    }

    /// Constraint for a field, if declared
    pub fn get(&self, key: &str) -> Option<&FieldConstraint> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, c)| c)
    }

    /// Whether the field is declared optional; undeclared fields are not
    pub fn is_optional(&self, key: &str) -> bool {
        self.get(key).map(|c| c.optional).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_properties() {
        assert!(FieldFormat::Text.has_length());
        assert!(FieldFormat::List.has_length());
        assert!(!FieldFormat::Integer.has_length());
        assert!(!FieldFormat::Boolean.has_length());

        assert!(FieldFormat::Email.is_textual());
        assert!(!FieldFormat::List.is_textual());
    }

    #[test]
    fn test_constraint_builder() {
        let constraint = FieldConstraint::text().length_between(3, 16).optional();

        assert_eq!(constraint.format, FieldFormat::Text);
        assert_eq!(constraint.min_length, Some(3));
        assert_eq!(constraint.max_length, Some(16));
        assert!(constraint.optional);
        assert!(!constraint.is_required());
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = Schema::new()
            .field("name", FieldConstraint::text())
            .field("description", FieldConstraint::text().optional())
            .field("icon", FieldConstraint::text().optional());

        let keys: Vec<&str> = schema.fields().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["name", "description", "icon"]);
        assert!(schema.is_optional("description"));
        assert!(!schema.is_optional("name"));
        assert!(!schema.is_optional("missing"));
    }

    #[test]
    fn test_schema_redeclare_replaces_in_place() {
        let schema = Schema::new()
            .field("a", FieldConstraint::text())
            .field("b", FieldConstraint::text())
            .field("a", FieldConstraint::email());

        assert_eq!(schema.len(), 2);
        let keys: Vec<&str> = schema.fields().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(schema.get("a").unwrap().format, FieldFormat::Email);
    }
}
