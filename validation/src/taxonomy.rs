use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

use crate::{Result, ValidationError};

/// Domain error names, in wire order.
///
/// The discriminant of every variant is its code and equals its 1-based
/// position in this list. The list is append-only: inserting or reordering
/// variants renumbers every code after the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum ErrorName {
    Unknown = 1,
    LoggedOut = 2,
    Required = 3,
    RequiredEmail = 4,
    RequiredUuid = 5,
    Length = 6,
    LengthExact = 7,
    Invalid = 8,
    InvalidRegex = 9,
    InvalidCredentials = 10,
    InvalidInvite = 11,
    InvalidRange = 12,
    EmailTaken = 13,
    IdTaken = 14,
    #[serde(rename = "ACCOUNT_404")]
    Account404 = 15,
    #[serde(rename = "POST_404")]
    Post404 = 16,
    #[serde(rename = "SERVER_404")]
    Server404 = 17,
    #[serde(rename = "CHANNEL_404")]
    Channel404 = 18,
    #[serde(rename = "MESSAGE_404")]
    Message404 = 19,
    #[serde(rename = "ROLE_404")]
    Role404 = 20,
    AlreadyInServer = 21,
    NotInServer = 22,
    NotOwner = 23,
    NotYourself = 24,
    NotFriend = 25,
    FriendAlreadySent = 26,
    FriendAlreadyPending = 27,
    FriendNotPending = 28,
    FriendAlreadyAccepted = 29,
    AlreadyPinned = 30,
    NotPinned = 31,
    TooMuch = 32,
    OverLimit = 33,
}

impl ErrorName {
    /// Every error name in declaration order
    pub const ALL: [ErrorName; 33] = [
        ErrorName::Unknown,
        ErrorName::LoggedOut,
        ErrorName::Required,
        ErrorName::RequiredEmail,
        ErrorName::RequiredUuid,
        ErrorName::Length,
        ErrorName::LengthExact,
        ErrorName::Invalid,
        ErrorName::InvalidRegex,
        ErrorName::InvalidCredentials,
        ErrorName::InvalidInvite,
        ErrorName::InvalidRange,
        ErrorName::EmailTaken,
        ErrorName::IdTaken,
        ErrorName::Account404,
        ErrorName::Post404,
        ErrorName::Server404,
        ErrorName::Channel404,
        ErrorName::Message404,
        ErrorName::Role404,
        ErrorName::AlreadyInServer,
        ErrorName::NotInServer,
        ErrorName::NotOwner,
        ErrorName::NotYourself,
        ErrorName::NotFriend,
        ErrorName::FriendAlreadySent,
        ErrorName::FriendAlreadyPending,
        ErrorName::FriendNotPending,
        ErrorName::FriendAlreadyAccepted,
        ErrorName::AlreadyPinned,
        ErrorName::NotPinned,
        ErrorName::TooMuch,
        ErrorName::OverLimit,
    ];

    /// Stable numeric code sent to clients
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up an error name by its numeric code
    pub fn from_code(code: u16) -> Result<Self> {
        // Codes start at 1, so code - 1 is the position in ALL
        code.checked_sub(1)
            .and_then(|index| Self::ALL.get(usize::from(index)))
            .copied()
            .ok_or(ValidationError::UnknownCode(code))
    }

    /// Wire identifier, e.g. `ACCOUNT_404`
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorName::Unknown => "UNKNOWN",
            ErrorName::LoggedOut => "LOGGED_OUT",
            ErrorName::Required => "REQUIRED",
            ErrorName::RequiredEmail => "REQUIRED_EMAIL",
            ErrorName::RequiredUuid => "REQUIRED_UUID",
            ErrorName::Length => "LENGTH",
            ErrorName::LengthExact => "LENGTH_EXACT",
            ErrorName::Invalid => "INVALID",
            ErrorName::InvalidRegex => "INVALID_REGEX",
            ErrorName::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorName::InvalidInvite => "INVALID_INVITE",
            ErrorName::InvalidRange => "INVALID_RANGE",
            ErrorName::EmailTaken => "EMAIL_TAKEN",
            ErrorName::IdTaken => "ID_TAKEN",
            ErrorName::Account404 => "ACCOUNT_404",
            ErrorName::Post404 => "POST_404",
            ErrorName::Server404 => "SERVER_404",
            ErrorName::Channel404 => "CHANNEL_404",
            ErrorName::Message404 => "MESSAGE_404",
            ErrorName::Role404 => "ROLE_404",
            ErrorName::AlreadyInServer => "ALREADY_IN_SERVER",
            ErrorName::NotInServer => "NOT_IN_SERVER",
            ErrorName::NotOwner => "NOT_OWNER",
            ErrorName::NotYourself => "NOT_YOURSELF",
            ErrorName::NotFriend => "NOT_FRIEND",
            ErrorName::FriendAlreadySent => "FRIEND_ALREADY_SENT",
            ErrorName::FriendAlreadyPending => "FRIEND_ALREADY_PENDING",
            ErrorName::FriendNotPending => "FRIEND_NOT_PENDING",
            ErrorName::FriendAlreadyAccepted => "FRIEND_ALREADY_ACCEPTED",
            ErrorName::AlreadyPinned => "ALREADY_PINNED",
            ErrorName::NotPinned => "NOT_PINNED",
            ErrorName::TooMuch => "TOO_MUCH",
            ErrorName::OverLimit => "OVER_LIMIT",
        }
    }

    /// Message template; every `{}` takes the next format parameter
    pub fn template(self) -> &'static str {
        match self {
            ErrorName::Unknown => "An unknown error occurred.",
            ErrorName::LoggedOut => "You must be logged in to perform this action.",
            ErrorName::Required => "{} is required.",
            ErrorName::RequiredEmail => "A valid email is required.",
            ErrorName::RequiredUuid => "A valid UUID is required.",
            ErrorName::Length => "{} must be between {} and {} characters.",
            ErrorName::LengthExact => "{} must be exactly {} characters.",
            ErrorName::Invalid => "{} is invalid.",
            ErrorName::InvalidRegex => "{} is not in the correct format.",
            ErrorName::InvalidCredentials => "Invalid email or password.",
            ErrorName::InvalidInvite => "This invite is invalid or has been disabled.",
            ErrorName::InvalidRange => "'from' can't be bigger than 'to'.",
            ErrorName::EmailTaken => "This email is already in use.",
            ErrorName::IdTaken => "This profile id is already in use.",
            ErrorName::Account404 => "This account does not exist.",
            ErrorName::Post404 => "This post does not exist.",
            ErrorName::Server404 => "This server does not exist.",
            ErrorName::Channel404 => "This channel does not exist.",
            ErrorName::Message404 => "This message does not exist.",
            ErrorName::Role404 => "This role does not exist.",
            ErrorName::AlreadyInServer => "You are already in this server.",
            ErrorName::NotInServer => "This account is not in the server.",
            ErrorName::NotOwner => "You are not the owner of this resource.",
            ErrorName::NotYourself => "You can't perform this action on yourself.",
            ErrorName::NotFriend => "This account is not your friend.",
            ErrorName::FriendAlreadySent => "This account has already sent you a friend request.",
            ErrorName::FriendAlreadyPending => {
                "You have already sent a friend request to this account."
            }
            ErrorName::FriendNotPending => "This account has not sent you a friend request.",
            ErrorName::FriendAlreadyAccepted => "This account is already your friend.",
            ErrorName::AlreadyPinned => "This message is already pinned.",
            ErrorName::NotPinned => "This message is not pinned.",
            ErrorName::TooMuch => "Can't fetch more than {} items at once.",
            ErrorName::OverLimit => "Can't have more than {} {}.",
        }
    }
}

impl fmt::Display for ErrorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownName(s.to_string()))
    }
}

/// Fill the `{}` placeholders of a template in order.
///
/// Placeholders without a matching parameter stay as `{}`; surplus
/// parameters are ignored.
pub fn render_template(template: &str, params: &[String]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut params = params.iter();
    let mut rest = template;

    while let Some(index) = rest.find("{}") {
        rendered.push_str(&rest[..index]);
        match params.next() {
            Some(param) => rendered.push_str(param),
            None => rendered.push_str("{}"),
        }
        rest = &rest[index + 2..];
    }
    rendered.push_str(rest);

    rendered
}

/// The single domain error surfaced to a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub message: String,
    pub code: u16,
    pub name: ErrorName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, JsonValue>>,
}

impl NormalizedError {
    /// Build an error with the plain template as its message
    pub fn new(name: ErrorName) -> Self {
        Self {
            message: name.template().to_string(),
            code: name.code(),
            name,
            extras: None,
        }
    }

    /// Substitute the template placeholders with `params`
    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        let params: Vec<String> = params.into_iter().map(|p| p.to_string()).collect();
        self.message = render_template(self.name.template(), &params);
        self
    }

    /// Attach extras; an empty map leaves the error without extras
    pub fn with_extras(mut self, extras: Map<String, JsonValue>) -> Self {
        self.extras = if extras.is_empty() { None } else { Some(extras) };
        self
    }

    /// Add one extra key
    pub fn with_extra(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extras
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Shorthand for the common `{for: field}` extra
    pub fn for_field(self, field: &str) -> Self {
        self.with_extra("for", field)
    }

    /// Value of `extras.for`, if present
    pub fn field(&self) -> Option<&str> {
        self.extras.as_ref()?.get("for")?.as_str()
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.code, self.message)
    }
}

impl std::error::Error for NormalizedError {}

impl From<ErrorName> for NormalizedError {
    fn from(name: ErrorName) -> Self {
        NormalizedError::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_codes_follow_declaration_order() {
        for (index, name) in ErrorName::ALL.iter().enumerate() {
            assert_eq!(usize::from(name.code()), index + 1, "{} out of order", name);
        }
    }

    #[test]
    fn test_from_code_round_trip() {
        for name in ErrorName::ALL {
            assert_eq!(ErrorName::from_code(name.code()), Ok(name));
        }
    }

    #[test]
    fn test_from_code_out_of_range() {
        assert_eq!(ErrorName::from_code(0), Err(ValidationError::UnknownCode(0)));
        let past_end = ErrorName::ALL.len() as u16 + 1;
        assert_eq!(
            ErrorName::from_code(past_end),
            Err(ValidationError::UnknownCode(past_end))
        );
    }

    #[test]
    fn test_serde_name_matches_as_str() {
        for name in ErrorName::ALL {
            let serialized = serde_json::to_value(name).unwrap();
            assert_eq!(serialized, json!(name.as_str()));
            assert_eq!(name.as_str().parse::<ErrorName>(), Ok(name));
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(
            "NOPE".parse::<ErrorName>(),
            Err(ValidationError::UnknownName("NOPE".to_string()))
        );
    }

    #[test]
    fn test_render_template() {
        let params = vec!["name".to_string(), "3".to_string(), "16".to_string()];
        assert_eq!(
            render_template(ErrorName::Length.template(), &params),
            "name must be between 3 and 16 characters."
        );

        // Missing parameters leave the placeholder
        assert_eq!(
            render_template("{} and {}", &["a".to_string()]),
            "a and {}"
        );

        // Surplus parameters are ignored
        assert_eq!(
            render_template("{}!", &["a".to_string(), "b".to_string()]),
            "a!"
        );
    }

    #[test]
    fn test_error_builder() {
        let err = NormalizedError::new(ErrorName::Required)
            .with_params(["email"])
            .for_field("email");

        assert_eq!(err.message, "email is required.");
        assert_eq!(err.code, 3);
        assert_eq!(err.field(), Some("email"));

        let serialized = serde_json::to_value(&err).unwrap();
        assert_eq!(
            serialized,
            json!({
                "message": "email is required.",
                "code": 3,
                "name": "REQUIRED",
                "extras": {"for": "email"}
            })
        );
    }

    #[test]
    fn test_empty_extras_are_dropped() {
        let err = NormalizedError::new(ErrorName::Unknown).with_extras(Map::new());
        assert!(err.extras.is_none());

        let serialized = serde_json::to_value(&err).unwrap();
        assert!(serialized.get("extras").is_none());
    }
}
