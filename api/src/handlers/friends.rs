//! Friend request handlers

use axum::{extract::State, response::Json, Extension};
use database::FriendStore;
use serde_json::Value as JsonValue;
use tracing::info;
use validation::ErrorName;

use super::{public_profiles, target_account};
use crate::{
    error::ApiResult,
    middleware_hooks::CurrentAccount,
    models::{FriendsResponse, SuccessResponse},
    AppState,
};

/// POST /api/v1/friends/add
#[utoipa::path(
    post,
    path = "/api/v1/friends/add",
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Request sent", body = SuccessResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse),
        (status = 409, description = "Already friends or pending", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "friends"
)]
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;
    let friends = FriendStore::new(&state.db);

    if target.id == me.id {
        return Err(ErrorName::NotYourself.into());
    }
    if friends.has_request(&target.id, &me.id).await? {
        return Err(ErrorName::FriendAlreadySent.into());
    }
    if friends.has_request(&me.id, &target.id).await? {
        return Err(ErrorName::FriendAlreadyPending.into());
    }
    if friends.are_friends(&me.id, &target.id).await? {
        return Err(ErrorName::FriendAlreadyAccepted.into());
    }

    friends.create_request(&me.id, &target.id).await?;
    Ok(Json(SuccessResponse::new("Friend request sent")))
}

/// POST /api/v1/friends/accept
#[utoipa::path(
    post,
    path = "/api/v1/friends/accept",
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 400, description = "No pending request", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse),
        (status = 409, description = "Already friends", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "friends"
)]
pub async fn accept_friend(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;
    let friends = FriendStore::new(&state.db);

    if target.id == me.id {
        return Err(ErrorName::NotYourself.into());
    }
    if friends.are_friends(&me.id, &target.id).await? {
        return Err(ErrorName::FriendAlreadyAccepted.into());
    }
    if !friends.has_request(&target.id, &me.id).await? {
        return Err(ErrorName::FriendNotPending.into());
    }

    friends.add_friendship(&me.id, &target.id).await?;

    info!("{} accepted the friend request of {}", me.id, target.id);
    Ok(Json(SuccessResponse::new("Friend request accepted")))
}

/// POST /api/v1/friends/reject
#[utoipa::path(
    post,
    path = "/api/v1/friends/reject",
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Request rejected", body = SuccessResponse),
        (status = 400, description = "No pending request", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "friends"
)]
pub async fn reject_friend(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;

    if !FriendStore::new(&state.db)
        .delete_request(&target.id, &me.id)
        .await?
    {
        return Err(ErrorName::FriendNotPending.into());
    }

    Ok(Json(SuccessResponse::new("Friend request rejected")))
}

/// POST /api/v1/friends/remove
#[utoipa::path(
    post,
    path = "/api/v1/friends/remove",
    request_body = TargetProfileRequest,
    responses(
        (status = 200, description = "Friend removed", body = SuccessResponse),
        (status = 400, description = "Not a friend", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "friends"
)]
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SuccessResponse>> {
    let target = target_account(&state, body).await?;

    if !FriendStore::new(&state.db)
        .remove_friendship(&me.id, &target.id)
        .await?
    {
        return Err(ErrorName::NotFriend.into());
    }

    info!("{} removed {} as a friend", me.id, target.id);
    Ok(Json(SuccessResponse::new("Friend removed")))
}

/// Friends and incoming requests
///
/// GET /api/v1/friends
#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses(
        (status = 200, description = "Friends and pending requests", body = FriendsResponse)
    ),
    security(("bearer" = [])),
    tag = "friends"
)]
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(CurrentAccount(me)): Extension<CurrentAccount>,
) -> ApiResult<Json<FriendsResponse>> {
    let store = FriendStore::new(&state.db);
    let friends = store.list_friends(&me.id).await?;
    let pending = store.list_pending(&me.id).await?;

    Ok(Json(FriendsResponse {
        friends: public_profiles(&state, friends).await,
        pending: public_profiles(&state, pending).await,
    }))
}
