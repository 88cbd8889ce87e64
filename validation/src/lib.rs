//! Input validation for Parley.
//!
//! A [`Schema`] declares per-field rules for one operation. The
//! [`SchemaValidator`] turns raw JSON input into [`RawFailure`]s, and
//! [`normalize`] reduces them to at most one [`NormalizedError`] drawn from
//! the [`ErrorName`] taxonomy.

pub mod error;
pub mod normalize;
pub mod schema;
pub mod taxonomy;
pub mod validation;

pub use error::{Result, ValidationError};
pub use normalize::{normalize, validate_schema};
pub use schema::{FieldConstraint, FieldFormat, Schema};
pub use taxonomy::{render_template, ErrorName, NormalizedError};
pub use validation::{FailureKind, RawFailure, SchemaValidator};
