//! Profile and post handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use database::{Account, AccountStore, PostStore};
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use validation::{ErrorName, NormalizedError};

use crate::{
    error::ApiResult,
    limits::MAX_STATUS,
    middleware_hooks::CurrentAccount,
    models::{
        NoteRequest, PostRequest, PostResponse, ProfileRequest, ProfileResponse, StatusRequest,
        SuccessResponse,
    },
    schemas::{self, non_empty, parse_body},
    AppState,
};

async fn find_profile(state: &AppState, profile_id: &str) -> ApiResult<Account> {
    AccountStore::new(&state.db)
        .find_by_profile_id(profile_id)
        .await?
        .ok_or_else(|| ErrorName::Account404.into())
}

/// Own profile, including the email address
///
/// GET /api/v1/me
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Json<ProfileResponse>> {
    let online = state.presence.is_online(&account.id).await;
    Ok(Json(ProfileResponse::own(account, online)))
}

/// POST /api/v1/me/status
#[utoipa::path(
    post,
    path = "/api/v1/me/status",
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Invalid status", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let req: StatusRequest = parse_body(&schemas::STATUS, body)?;

    if !(0..=MAX_STATUS).contains(&req.status) {
        return Err(NormalizedError::new(ErrorName::Invalid)
            .with_params(["status"])
            .for_field("status")
            .into());
    }

    AccountStore::new(&state.db)
        .update_status(&account.id, req.status)
        .await?;

    debug!("Account {} set status {}", account.id, req.status);
    Ok(Json(SuccessResponse::new("Status updated")))
}

/// Set the profile note; an empty note clears it
///
/// POST /api/v1/me/note
#[utoipa::path(
    post,
    path = "/api/v1/me/note",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = SuccessResponse),
        (status = 400, description = "Invalid note", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn update_note(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let req: NoteRequest = parse_body(&schemas::NOTE, body)?;
    let note = non_empty(req.note);

    AccountStore::new(&state.db)
        .update_note(&account.id, note.as_deref())
        .await?;

    Ok(Json(SuccessResponse::new("Note updated")))
}

/// Edit profile fields; absent keys are left alone
///
/// POST /api/v1/me/profile
#[utoipa::path(
    post,
    path = "/api/v1/me/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentAccount(mut account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<ProfileResponse>> {
    let req: ProfileRequest = parse_body(&schemas::PROFILE, body)?;

    if let Some(username) = non_empty(req.username) {
        account.username = username;
    }
    // Empty strings clear the optional columns
    if let Some(bio) = req.bio {
        account.bio = non_empty(Some(bio));
    }
    if let Some(avatar) = req.avatar {
        account.avatar = non_empty(Some(avatar));
    }
    if let Some(banner) = req.banner {
        account.banner = non_empty(Some(banner));
    }

    AccountStore::new(&state.db).update_profile(&account).await?;
    info!("Account {} updated their profile", account.id);

    let online = state.presence.is_online(&account.id).await;
    Ok(Json(ProfileResponse::own(account, online)))
}

/// GET /api/v1/profiles/{profile_id}
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{profile_id}",
    params(("profile_id" = String, Path, description = "Public handle of the account")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
    Path(profile_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let account = find_profile(&state, &profile_id).await?;
    let online = state.presence.is_online(&account.id).await;

    let profile = if account.id == me.id {
        ProfileResponse::own(account, online)
    } else {
        ProfileResponse::public(account, online)
    };

    Ok(Json(profile))
}

/// POST /api/v1/me/posts
#[utoipa::path(
    post,
    path = "/api/v1/me/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let req: PostRequest = parse_body(&schemas::POST, body)?;
    let attachment = non_empty(req.attachment);

    let post = PostStore::new(&state.db)
        .create(&account.id, &req.content, attachment.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Posts of an account, newest first
///
/// GET /api/v1/profiles/{profile_id}/posts
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{profile_id}/posts",
    params(("profile_id" = String, Path, description = "Public handle of the account")),
    responses(
        (status = 200, description = "Posts", body = Vec<PostResponse>),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let account = find_profile(&state, &profile_id).await?;
    let posts = PostStore::new(&state.db).list_by_author(&account.id).await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// DELETE /api/v1/me/posts/{post_id}
#[utoipa::path(
    delete,
    path = "/api/v1/me/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post to delete")),
    responses(
        (status = 200, description = "Post deleted", body = SuccessResponse),
        (status = 404, description = "No such post of yours", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "profiles"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    if !PostStore::new(&state.db).delete(&post_id, &account.id).await? {
        return Err(ErrorName::Post404.into());
    }

    Ok(Json(SuccessResponse::new("Post deleted")))
}
