//! Role handlers

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use database::{Role, RoleStore, ServerStore};
use serde_json::Value as JsonValue;
use validation::{ErrorName, NormalizedError};

use crate::{
    error::ApiResult,
    limits::{DEFAULT_ROLE_COLOR, MAX_ROLES},
    middleware_hooks::{RoleScope, ServerScope},
    models::{AssignRoleRequest, RoleRequest, RoleResponse, SuccessResponse},
    schemas::{self, non_empty, parse_body},
    AppState,
};

/// Account ids from a `members` list, deduplicated in order
fn member_ids(members: Vec<JsonValue>) -> ApiResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(members.len());

    for member in members {
        let JsonValue::String(id) = member else {
            return Err(NormalizedError::new(ErrorName::Invalid)
                .with_params(["members"])
                .for_field("members")
                .into());
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Check every id is a member of the server, then store the assignment
async fn assign_members(
    state: &AppState,
    role: &Role,
    members: Vec<JsonValue>,
) -> ApiResult<Vec<String>> {
    let ids = member_ids(members)?;
    let servers = ServerStore::new(&state.db);

    for id in &ids {
        if !servers.is_member(&role.server_id, id).await? {
            return Err(ErrorName::NotInServer.into());
        }
    }

    RoleStore::new(&state.db).set_members(role, &ids).await?;
    Ok(ids)
}

/// POST /api/v1/servers/{server_id}/roles/create
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/roles/create",
    params(("server_id" = String, Path, description = "Server id")),
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Invalid input, role limit reached or member not in server", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "roles"
)]
pub async fn create_role(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let req: RoleRequest = parse_body(&schemas::CREATE_ROLE, body)?;
    let roles = RoleStore::new(&state.db);

    if roles.count(&server.id).await? >= MAX_ROLES {
        return Err(NormalizedError::new(ErrorName::OverLimit)
            .with_params([MAX_ROLES.to_string(), "roles".to_string()])
            .into());
    }

    // Reject bad member lists before the role exists
    let ids = match req.members {
        Some(members) => member_ids(members)?,
        None => Vec::new(),
    };
    let servers = ServerStore::new(&state.db);
    for id in &ids {
        if !servers.is_member(&server.id, id).await? {
            return Err(ErrorName::NotInServer.into());
        }
    }

    let color = non_empty(req.color).unwrap_or_else(|| DEFAULT_ROLE_COLOR.to_string());
    let role = roles.create(&server.id, &req.name, &color).await?;
    if !ids.is_empty() {
        roles.set_members(&role, &ids).await?;
    }

    Ok((StatusCode::CREATED, Json(RoleResponse::new(role, ids))))
}

/// Rename or recolor a role; a `members` list replaces the assignment
///
/// POST /api/v1/servers/{server_id}/roles/{role_id}/edit
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/roles/{role_id}/edit",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("role_id" = String, Path, description = "Role id")
    ),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Invalid input or member not in server", body = ApiErrorResponse),
        (status = 404, description = "No such role", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "roles"
)]
pub async fn edit_role(
    State(state): State<AppState>,
    Extension(RoleScope(mut role)): Extension<RoleScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<RoleResponse>> {
    let req: RoleRequest = parse_body(&schemas::EDIT_ROLE, body)?;
    let roles = RoleStore::new(&state.db);

    role.name = req.name;
    if let Some(color) = non_empty(req.color) {
        role.hex_color = color;
    }

    let members = match req.members {
        Some(members) => assign_members(&state, &role, members).await?,
        None => roles.member_ids(&role.id).await?,
    };
    roles.update(&role).await?;

    Ok(Json(RoleResponse::new(role, members)))
}

/// POST /api/v1/servers/{server_id}/roles/{role_id}/assign
#[utoipa::path(
    post,
    path = "/api/v1/servers/{server_id}/roles/{role_id}/assign",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("role_id" = String, Path, description = "Role id")
    ),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Members assigned", body = RoleResponse),
        (status = 400, description = "Invalid list or member not in server", body = ApiErrorResponse),
        (status = 404, description = "No such role", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "roles"
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(RoleScope(role)): Extension<RoleScope>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<RoleResponse>> {
    let req: AssignRoleRequest = parse_body(&schemas::ASSIGN_ROLE, body)?;
    let members = assign_members(&state, &role, req.members).await?;

    Ok(Json(RoleResponse::new(role, members)))
}

/// DELETE /api/v1/servers/{server_id}/roles/{role_id}
#[utoipa::path(
    delete,
    path = "/api/v1/servers/{server_id}/roles/{role_id}",
    params(
        ("server_id" = String, Path, description = "Server id"),
        ("role_id" = String, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role deleted", body = SuccessResponse),
        (status = 404, description = "No such role", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "roles"
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(RoleScope(role)): Extension<RoleScope>,
) -> ApiResult<Json<SuccessResponse>> {
    RoleStore::new(&state.db).delete(&role.id).await?;
    Ok(Json(SuccessResponse::new("Role deleted")))
}

/// Roles of a server with their member ids
///
/// GET /api/v1/servers/{server_id}/roles
#[utoipa::path(
    get,
    path = "/api/v1/servers/{server_id}/roles",
    params(("server_id" = String, Path, description = "Server id")),
    responses(
        (status = 200, description = "Roles", body = Vec<RoleResponse>),
        (status = 400, description = "Not a member", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "roles"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(ServerScope(server)): Extension<ServerScope>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = RoleStore::new(&state.db);
    let mut listed = Vec::new();

    for role in roles.list(&server.id).await? {
        let members = roles.member_ids(&role.id).await?;
        listed.push(RoleResponse::new(role, members));
    }

    Ok(Json(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;

    #[test]
    fn member_ids_deduplicate_in_order() {
        let ids = member_ids(vec![json!("b"), json!("a"), json!("b")]).unwrap();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn non_string_member_is_invalid() {
        let err = member_ids(vec![json!("a"), json!(7)]).unwrap_err();
        match err {
            ApiError::Domain(err) => {
                assert_eq!(err.name, ErrorName::Invalid);
                assert_eq!(err.field(), Some("members"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
