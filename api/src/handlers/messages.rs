//! Message history, editing and pins

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use database::{AccountStore, MessageStore, NewMessage};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::debug;
use validation::{ErrorName, NormalizedError, Schema};

use super::public_profiles;
use crate::{
    error::ApiResult,
    limits::{MAX_MESSAGES_LOADED, MAX_PINS},
    middleware_hooks::{ChannelScope, CurrentAccount, MessageScope, ServerScope},
    models::{
        EditMessageRequest, FetchMessagesQuery, MessageHistoryResponse, MessageResponse,
        SendMessageRequest, SuccessResponse,
    },
    schemas::{self, non_empty, parse_value},
    AppState,
};

/// Body with its `content` string trimmed, so blank messages fail validation
fn trimmed_content(body: Option<Json<JsonValue>>) -> JsonValue {
    let mut value = body.map(|Json(value)| value).unwrap_or(JsonValue::Null);

    if let Some(JsonValue::String(text)) = value.get_mut("content") {
        *text = text.trim().to_string();
    }

    value
}

/// Turn query parameters into a JSON object for schema validation.
///
/// Only the keys the schema declares are read, in declaration order. Each
/// must parse as an integer; the first one that does not is reported as
/// INVALID for its key.
fn query_object(schema: &Schema, params: &HashMap<String, String>) -> ApiResult<JsonValue> {
    let mut object = Map::new();

    for (key, _) in schema.fields() {
        let Some(raw) = params.get(key) else {
            continue;
        };
        let Ok(number) = raw.trim().parse::<i64>() else {
            return Err(NormalizedError::new(ErrorName::Invalid)
                .with_params([key])
                .for_field(key)
                .into());
        };
        object.insert(key.to_string(), JsonValue::from(number));
    }

    Ok(JsonValue::Object(object))
}

/// POST /api/v1/servers/{server_id}/channels/{channel_id}/messages
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Invalid content", body = ApiErrorResponse),
        (status = 404, description = "Replied message not in this channel", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(ChannelScope(channel)): Extension<ChannelScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let req: SendMessageRequest = parse_value(&schemas::SEND_MESSAGE, trimmed_content(body))?;
    let messages = MessageStore::new(&state.db);

    let reply_id = non_empty(req.reply_id);
    if let Some(reply_id) = &reply_id {
        if messages.find(&channel.id, reply_id).await?.is_none() {
            return Err(ErrorName::Message404.into());
        }
    }

    let message = messages
        .create(NewMessage {
            server_id: channel.server_id,
            channel_id: channel.id,
            author_id: account.id,
            content: req.content,
            reply_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// Channel history window.
///
/// `from` and `to` count back from the newest message; the window holds
/// `to - from` messages and is returned oldest first.
///
/// GET /api/v1/servers/{server_id}/channels/{channel_id}/messages
#[utoipa::path(
    get,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id"),
        ("from" = i64, Query, description = "Messages to skip, counted from the newest"),
        ("to" = i64, Query, description = "End of the window, counted from the newest")
    ),
    responses(
        (status = 200, description = "Messages and their authors", body = MessageHistoryResponse),
        (status = 400, description = "Invalid window", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn fetch_messages(
    State(state): State<AppState>,
    Extension(ChannelScope(channel)): Extension<ChannelScope>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<MessageHistoryResponse>> {
    let window: FetchMessagesQuery = parse_value(
        &schemas::FETCH_MESSAGES,
        query_object(&schemas::FETCH_MESSAGES, &params)?,
    )?;

    if window.from < 0 {
        return Err(NormalizedError::new(ErrorName::Invalid)
            .with_params(["from"])
            .for_field("from")
            .into());
    }
    if window.from > window.to {
        return Err(ErrorName::InvalidRange.into());
    }
    if window.to - window.from > MAX_MESSAGES_LOADED {
        return Err(NormalizedError::new(ErrorName::TooMuch)
            .with_params([MAX_MESSAGES_LOADED])
            .into());
    }

    let messages = MessageStore::new(&state.db)
        .fetch_range(&channel.id, window.from, window.to - window.from)
        .await?;

    let mut author_ids: Vec<String> = messages.iter().map(|m| m.author_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();

    let authors = AccountStore::new(&state.db)
        .find_many_by_ids(&author_ids)
        .await?;

    debug!(
        "Loaded {} messages from channel {}",
        messages.len(),
        channel.id
    );

    Ok(Json(MessageHistoryResponse {
        messages: messages.into_iter().map(MessageResponse::from).collect(),
        authors: public_profiles(&state, authors).await,
    }))
}

/// Only the author may edit
///
/// POST /api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/edit
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/edit",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id"),
        ("message_id" = String, Path, description = "Message id")
    ),
    request_body = EditMessageRequest,
    responses(
        (status = 200, description = "Message edited", body = MessageResponse),
        (status = 403, description = "Not the author", body = ApiErrorResponse),
        (status = 404, description = "No such message", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(MessageScope(mut message)): Extension<MessageScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<MessageResponse>> {
    let req: EditMessageRequest = parse_value(&schemas::EDIT_MESSAGE, trimmed_content(body))?;

    if message.author_id != account.id {
        return Err(ErrorName::NotOwner.into());
    }

    MessageStore::new(&state.db)
        .update_content(&message.id, &req.content)
        .await?;
    message.content = req.content;
    message.edited = true;

    Ok(Json(message.into()))
}

/// The author or the server owner may delete
///
/// DELETE /api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}
#[utoipa::path(
    delete,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id"),
        ("message_id" = String, Path, description = "Message id")
    ),
    responses(
        (status = 200, description = "Message deleted", body = SuccessResponse),
        (status = 403, description = "Neither author nor owner", body = ApiErrorResponse),
        (status = 404, description = "No such message", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    Extension(MessageScope(message)): Extension<MessageScope>,
) -> ApiResult<Json<SuccessResponse>> {
    if message.author_id != account.id && server.owner_id != account.id {
        return Err(ErrorName::NotOwner.into());
    }

    MessageStore::new(&state.db).delete(&message.id).await?;
    Ok(Json(SuccessResponse::new("Message deleted")))
}

/// POST /api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/pin
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/pin",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id"),
        ("message_id" = String, Path, description = "Message id")
    ),
    responses(
        (status = 200, description = "Message pinned", body = SuccessResponse),
        (status = 400, description = "Pin limit reached", body = ApiErrorResponse),
        (status = 409, description = "Already pinned", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn pin_message(
    State(state): State<AppState>,
    Extension(MessageScope(message)): Extension<MessageScope>,
) -> ApiResult<Json<SuccessResponse>> {
    let messages = MessageStore::new(&state.db);

    if messages.is_pinned(&message.id).await? {
        return Err(ErrorName::AlreadyPinned.into());
    }
    if messages.count_pins(&message.channel_id).await? >= MAX_PINS {
        return Err(NormalizedError::new(ErrorName::OverLimit)
            .with_params([MAX_PINS.to_string(), "pins".to_string()])
            .into());
    }

    messages.pin(&message).await?;
    Ok(Json(SuccessResponse::new("Message pinned")))
}

/// POST /api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/unpin
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/messages/{message_id}/unpin",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id"),
        ("message_id" = String, Path, description = "Message id")
    ),
    responses(
        (status = 200, description = "Message unpinned", body = SuccessResponse),
        (status = 400, description = "Not pinned", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn unpin_message(
    State(state): State<AppState>,
    Extension(MessageScope(message)): Extension<MessageScope>,
) -> ApiResult<Json<SuccessResponse>> {
    if !MessageStore::new(&state.db).unpin(&message.id).await? {
        return Err(ErrorName::NotPinned.into());
    }

    Ok(Json(SuccessResponse::new("Message unpinned")))
}

/// GET /api/v1/servers/{server_id}/channels/{channel_id}/pins
#[utoipa::path(
    get,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/pins",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id")
    ),
    responses((status = 200, description = "Pinned messages", body = Vec<MessageResponse>)),
    security(("bearer" = [])),
    tag = "messages"
)]
pub async fn list_pins(
    State(state): State<AppState>,
    Extension(ChannelScope(channel)): Extension<ChannelScope>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let pins = MessageStore::new(&state.db).list_pins(&channel.id).await?;
    Ok(Json(pins.into_iter().map(MessageResponse::from).collect()))
}
