//! Channel handlers

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use database::ChannelStore;
use serde_json::Value as JsonValue;
use validation::{ErrorName, NormalizedError};

use crate::{
    error::ApiResult,
    limits::MAX_CHANNELS,
    middleware_hooks::{ChannelScope, ServerScope},
    models::{ChannelRequest, ChannelResponse, SuccessResponse},
    schemas::{self, parse_body},
    AppState,
};

/// POST /api/v1/servers/{server_id}/channels/create
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/create",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = ChannelRequest,
    responses(
        (status = 201, description = "Channel created", body = ChannelResponse),
        (status = 400, description = "Invalid name or channel limit reached", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn create_channel(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<ChannelResponse>)> {
    let req: ChannelRequest = parse_body(&schemas::CHANNEL, body)?;
    let channels = ChannelStore::new(&state.db);

    if channels.count(&server.id).await? >= MAX_CHANNELS {
        return Err(NormalizedError::new(ErrorName::OverLimit)
            .with_params([MAX_CHANNELS.to_string(), "channels".to_string()])
            .into());
    }

    let channel = channels.create(&server.id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(channel.into())))
}

/// GET /api/v1/servers/{server_id}/channels
#[utoipa::path(
    get,
    path = "/api/v1/servers/{server_id}/channels",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Channels", body = Vec<ChannelResponse>),
        (status = 400, description = "Not a member", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn list_channels(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<Vec<ChannelResponse>>> {
    let channels = ChannelStore::new(&state.db).list(&server.id).await?;
    Ok(Json(channels.into_iter().map(ChannelResponse::from).collect()))
}

/// POST /api/v1/servers/{server_id}/channels/{channel_id}/rename
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}/rename",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id")
    ),
    request_body = ChannelRequest,
    responses(
        (status = 200, description = "Channel renamed", body = ChannelResponse),
        (status = 404, description = "No such channel", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn rename_channel(
    State(state): State<AppState>,
    Extension(ChannelScope(mut channel)): Extension<ChannelScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<ChannelResponse>> {
    let req: ChannelRequest = parse_body(&schemas::CHANNEL, body)?;

    ChannelStore::new(&state.db)
        .rename(&channel.id, &req.name)
        .await?;
    channel.name = req.name;

    Ok(Json(channel.into()))
}

/// Delete a channel with its messages and pins
///
/// DELETE /api/v1/servers/{server_id}/channels/{channel_id}
#[utoipa::path(
    delete,
    path = "/api/v1/servers/{server_id}/channels/{channel_id}",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("channel_id" = String, Path, description = "Channel id")
    ),
    responses(
        (status = 200, description = "Channel deleted", body = SuccessResponse),
        (status = 404, description = "No such channel", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(ChannelScope(channel)): Extension<ChannelScope>,
) -> ApiResult<Json<SuccessResponse>> {
    ChannelStore::new(&state.db).delete(&channel.id).await?;
    Ok(Json(SuccessResponse::new("Channel deleted")))
}
