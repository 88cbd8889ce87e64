//! Server and membership handlers

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use database::ServerStore;
use serde_json::Value as JsonValue;
use tracing::info;
use validation::ErrorName;

use super::{public_profiles, target_account};
use crate::{
    error::ApiResult,
    middleware_hooks::{CurrentAccount, ServerScope},
    models::{
        CreateServerRequest, EditServerRequest, InviteResponse, JoinServerRequest,
        ProfileResponse, ServerResponse, SuccessResponse, ToggleInvitesRequest,
    },
    schemas::{self, non_empty, parse_body},
    AppState,
};

/// POST /api/v1/servers/create
#[utoipa::path(
    post,
    path = "/api/v1/servers/create",
    request_body = CreateServerRequest,
    responses(
        (status = 201, description = "Server created", body = ServerResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn create_server(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<ServerResponse>)> {
    let req: CreateServerRequest = parse_body(&schemas::CREATE_SERVER, body)?;
    let description = non_empty(req.description);
    let icon = non_empty(req.icon);

    let server = ServerStore::new(&state.db)
        .create(&account.id, &req.name, description.as_deref(), icon.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(server.into())))
}

/// Servers the caller belongs to
///
/// GET /api/v1/servers
#[utoipa::path(
    get,
    path = "/api/v1/servers",
    responses((status = 200, description = "Servers", body = Vec<ServerResponse>)),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn list_servers(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Json<Vec<ServerResponse>>> {
    let servers = ServerStore::new(&state.db)
        .list_for_account(&account.id)
        .await?;

    Ok(Json(servers.into_iter().map(ServerResponse::from).collect()))
}

/// POST /api/v1/servers/join
#[utoipa::path(
    post,
    path = "/api/v1/servers/join",
    request_body = JoinServerRequest,
    responses(
        (status = 200, description = "Joined", body = ServerResponse),
        (status = 400, description = "Invalid or disabled invite", body = ApiErrorResponse),
        (status = 409, description = "Already a member", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn join_server(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<ServerResponse>> {
    let req: JoinServerRequest = parse_body(&schemas::JOIN_SERVER, body)?;
    let servers = ServerStore::new(&state.db);

    let server = servers
        .find_by_invite(&req.invite)
        .await?
        .filter(|server| !server.invites_disabled)
        .ok_or(ErrorName::InvalidInvite)?;

    if servers.is_member(&server.id, &account.id).await? {
        return Err(ErrorName::AlreadyInServer.into());
    }

    servers.add_member(&server.id, &account.id).await?;
    Ok(Json(server.into()))
}

/// Owner only; absent keys are left alone and empty strings clear
///
/// POST /api/v1/servers/{server_id}/edit
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/edit",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = EditServerRequest,
    responses(
        (status = 200, description = "Updated server", body = ServerResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "No such server", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn edit_server(
    State(state): State<AppState>,
    Extension(ServerScope(mut server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<ServerResponse>> {
    let req: EditServerRequest = parse_body(&schemas::EDIT_SERVER, body)?;

    if let Some(name) = non_empty(req.name) {
        server.name = name;
    }
    if let Some(description) = req.description {
        server.description = non_empty(Some(description));
    }
    if let Some(icon) = req.icon {
        server.icon = non_empty(Some(icon));
    }

    ServerStore::new(&state.db).update(&server).await?;
    Ok(Json(server.into()))
}

/// Leave a server; the owner leaving deletes it
///
/// POST /api/v1/servers/{server_id}/leave
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/leave",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Left the server", body = SuccessResponse),
        (status = 404, description = "No such server", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn leave_server(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<SuccessResponse>> {
    let servers = ServerStore::new(&state.db);

    if server.owner_id == account.id {
        servers.delete(&server.id).await?;
        info!("Owner {} left and deleted server {}", account.id, server.id);
        return Ok(Json(SuccessResponse::new("Server deleted")));
    }

    servers.remove_member(&server.id, &account.id).await?;
    Ok(Json(SuccessResponse::new("Left server")))
}

/// DELETE /api/v1/servers/{server_id}
#[utoipa::path(
    delete,
    path = "/api/v1/servers/{server_id}",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Server deleted", body = SuccessResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "No such server", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn delete_server(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<SuccessResponse>> {
    ServerStore::new(&state.db).delete(&server.id).await?;
    Ok(Json(SuccessResponse::new("Server deleted")))
}

/// POST /api/v1/servers/{server_id}/invite/regenerate
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/invite/regenerate",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "New invite", body = InviteResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn regenerate_invite(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<InviteResponse>> {
    let invite = ServerStore::new(&state.db)
        .regenerate_invite(&server.id)
        .await?;

    Ok(Json(InviteResponse { invite }))
}

/// POST /api/v1/servers/{server_id}/invite/toggle
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/invite/toggle",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = ToggleInvitesRequest,
    responses(
        (status = 200, description = "Invites toggled", body = SuccessResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn toggle_invites(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let req: ToggleInvitesRequest = parse_body(&schemas::TOGGLE_INVITES, body)?;

    ServerStore::new(&state.db)
        .set_invites_disabled(&server.id, !req.enabled)
        .await?;

    let message = if req.enabled {
        "Invites enabled"
    } else {
        "Invites disabled"
    };
    Ok(Json(SuccessResponse::new(message)))
}

/// Hand the server to another member
///
/// POST /api/v1/servers/{server_id}/transfer
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/transfer",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Ownership transferred", body = SuccessResponse),
        (status = 400, description = "Target is the caller or not a member", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn transfer_server(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;
    let servers = ServerStore::new(&state.db);

    if target.id == account.id {
        return Err(ErrorName::NotYourself.into());
    }
    if !servers.is_member(&server.id, &target.id).await? {
        return Err(ErrorName::NotInServer.into());
    }

    servers.transfer(&server.id, &target.id).await?;
    Ok(Json(SuccessResponse::new("Ownership transferred")))
}

/// Remove a member along with their roles
///
/// POST /api/v1/servers/{server_id}/kick
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/kick",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Member kicked", body = SuccessResponse),
        (status = 400, description = "Target is the caller or not a member", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn kick_member(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;
    let servers = ServerStore::new(&state.db);

    if target.id == account.id {
        return Err(ErrorName::NotYourself.into());
    }
    if !servers.remove_member(&server.id, &target.id).await? {
        return Err(ErrorName::NotInServer.into());
    }

    info!("{} was kicked from server {}", target.id, server.id);
    Ok(Json(SuccessResponse::new("Member kicked")))
}

/// GET /api/v1/servers/{server_id}/members
#[utoipa::path(
    get,
    path = "/api/v1/servers/{server_id}/members",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Members", body = Vec<ProfileResponse>),
        (status = 400, description = "Not a member", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "servers"
)]
pub async fn list_members(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    let members = ServerStore::new(&state.db).members(&server.id).await?;
    Ok(Json(public_profiles(&state, members).await))
}
