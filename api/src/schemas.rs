//! Request body schemas, one per operation.
//!
//! Schemas are built once on first use and shared by every request.

use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::error;
use validation::{validate_schema, FieldConstraint, Schema};

use crate::error::{ApiError, ApiResult};

static PROFILE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9.]+$").expect("profile id pattern is a valid regex"));

static HTTPS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://.+$").expect("https pattern is a valid regex"));

static HEX_COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("color pattern is a valid regex"));

// Shared field fragments

fn profile_id() -> FieldConstraint {
    FieldConstraint::text()
        .length_between(5, 30)
        .matching(&PROFILE_ID_PATTERN)
}

fn username() -> FieldConstraint {
    FieldConstraint::text().length_between(5, 30)
}

fn email() -> FieldConstraint {
    FieldConstraint::email().max_length(120)
}

fn password() -> FieldConstraint {
    FieldConstraint::text().length_between(8, 90)
}

fn https() -> FieldConstraint {
    FieldConstraint::text().max_length(512).matching(&HTTPS_PATTERN)
}

fn server_name() -> FieldConstraint {
    FieldConstraint::text().length_between(3, 16)
}

fn server_description() -> FieldConstraint {
    FieldConstraint::text().length_between(5, 50)
}

fn message_content() -> FieldConstraint {
    FieldConstraint::text().length_between(1, 512)
}

fn role_name() -> FieldConstraint {
    FieldConstraint::text().length_between(1, 15)
}

fn role_members() -> FieldConstraint {
    FieldConstraint::list().max_length(crate::limits::MAX_ROLE_MEMBERS)
}

// Accounts

pub static REGISTER: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("username", username())
        .field("profile_id", profile_id())
        .field("email", email())
        .field("password", password())
});

pub static LOGIN: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("email", email())
        .field("password", password())
});

pub static STATUS: Lazy<Schema> =
    Lazy::new(|| Schema::new().field("status", FieldConstraint::integer()));

pub static NOTE: Lazy<Schema> = Lazy::new(|| {
    Schema::new().field("note", FieldConstraint::text().max_length(20).optional())
});

pub static PROFILE: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("username", username().optional())
        .field("bio", FieldConstraint::text().max_length(128).optional())
        .field("avatar", https().optional())
        .field("banner", https().optional())
});

pub static POST: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("content", FieldConstraint::text().length_between(1, 256))
        .field("attachment", https().optional())
});

/// Any operation targeting another account by profile id
pub static TARGET_PROFILE: Lazy<Schema> =
    Lazy::new(|| Schema::new().field("profile_id", profile_id()));

// Servers

pub static CREATE_SERVER: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("name", server_name())
        .field("description", server_description().optional())
        .field("icon", https().optional())
});

pub static EDIT_SERVER: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("name", server_name().optional())
        .field("description", server_description().optional())
        .field("icon", https().optional())
});

pub static JOIN_SERVER: Lazy<Schema> = Lazy::new(|| {
    Schema::new().field(
        "invite",
        FieldConstraint::text().exact_length(database::servers::INVITE_LENGTH),
    )
});

pub static TOGGLE_INVITES: Lazy<Schema> =
    Lazy::new(|| Schema::new().field("enabled", FieldConstraint::boolean()));

// Channels and messages

pub static CHANNEL: Lazy<Schema> = Lazy::new(|| {
    Schema::new().field("name", FieldConstraint::text().length_between(2, 15))
});

pub static SEND_MESSAGE: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("content", message_content())
        .field("reply_id", FieldConstraint::uuid().optional())
});

pub static EDIT_MESSAGE: Lazy<Schema> =
    Lazy::new(|| Schema::new().field("content", message_content()));

pub static FETCH_MESSAGES: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("from", FieldConstraint::integer())
        .field("to", FieldConstraint::integer())
});

// Roles

pub static CREATE_ROLE: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field("name", role_name())
        .field(
            "color",
            FieldConstraint::text().matching(&HEX_COLOR_PATTERN).optional(),
        )
        .field("members", role_members().optional())
});

pub static EDIT_ROLE: Lazy<Schema> = Lazy::new(|| Schema::clone(&CREATE_ROLE));

pub static ASSIGN_ROLE: Lazy<Schema> =
    Lazy::new(|| Schema::new().field("members", role_members().min_length(1)));

/// Validate a raw body and deserialize it into the typed request.
///
/// A missing or malformed body is validated as an empty object.
pub fn parse_body<T: DeserializeOwned>(
    schema: &Schema,
    body: Option<Json<JsonValue>>,
) -> ApiResult<T> {
    let value = body.map(|Json(value)| value).unwrap_or(JsonValue::Null);
    parse_value(schema, value)
}

/// Validate an already built JSON value and deserialize it
pub fn parse_value<T: DeserializeOwned>(schema: &Schema, value: JsonValue) -> ApiResult<T> {
    if let Some(err) = validate_schema(schema, &value) {
        return Err(ApiError::Domain(err));
    }

    let value = if value.is_object() {
        value
    } else {
        JsonValue::Object(Default::default())
    };

    serde_json::from_value(value).map_err(|e| {
        error!("Validated body failed to deserialize: {}", e);
        ApiError::Internal(e.to_string())
    })
}

/// Treat an empty optional string as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
