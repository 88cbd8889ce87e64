//! Account registration and session handlers

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use database::{AccountStore, NewAccount};
use serde_json::Value as JsonValue;
use tracing::{info, warn};
use validation::ErrorName;

use crate::{
    error::{ApiError, ApiResult},
    middleware_hooks::CurrentAccount,
    models::{
        LoginRequest, RegisterRequest, SessionResponse, SuccessResponse, TokenResponse,
    },
    password::{hash_password, verify_password},
    schemas::{self, parse_body},
    AppState,
};

/// Register a new account
///
/// POST /api/v1/register
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid input", body = ApiErrorResponse),
        (status = 409, description = "Email or profile id taken", body = ApiErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let req: RegisterRequest = parse_body(&schemas::REGISTER, body)?;
    let email = req.email.to_lowercase();
    let accounts = AccountStore::new(&state.db);

    if accounts.find_by_email(&email).await?.is_some() {
        return Err(ErrorName::EmailTaken.into());
    }
    if accounts.find_by_profile_id(&req.profile_id).await?.is_some() {
        return Err(ErrorName::IdTaken.into());
    }

    let account = accounts
        .create(NewAccount {
            profile_id: req.profile_id,
            username: req.username,
            email,
            password_hash: hash_password(&req.password)?,
        })
        .await?;
    let token = accounts.issue_token(&account.id).await?;
    state.presence.login(&account.id).await;

    info!("Registered account {}", account.profile_id);

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            id: account.id,
            token,
        }),
    ))
}

/// Log in with email and password
///
/// POST /api/v1/login
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorResponse)
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Json<SessionResponse>> {
    let req: LoginRequest = parse_body(&schemas::LOGIN, body)?;
    let accounts = AccountStore::new(&state.db);

    let account = accounts
        .find_by_email(&req.email.to_lowercase())
        .await?
        .filter(|account| verify_password(&req.password, &account.password_hash))
        .ok_or_else(|| {
            warn!("Failed login attempt");
            ApiError::named(ErrorName::InvalidCredentials)
        })?;

    // Existing sessions keep their token
    let token = match accounts.token_for(&account.id).await? {
        Some(token) => token,
        None => accounts.issue_token(&account.id).await?,
    };
    state.presence.login(&account.id).await;

    info!("Account {} logged in", account.id);

    Ok(Json(SessionResponse {
        id: account.id,
        token,
    }))
}

/// Revoke the current session
///
/// POST /api/v1/logout
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Json<SuccessResponse>> {
    AccountStore::new(&state.db).revoke_token(&account.id).await?;
    state.presence.logout(&account.id).await;

    info!("Account {} logged out", account.id);
    Ok(Json(SuccessResponse::new("Logged out")))
}

/// Replace the session token, invalidating the old one
///
/// POST /api/v1/token/regenerate
#[utoipa::path(
    post,
    path = "/api/v1/token/regenerate",
    responses(
        (status = 200, description = "New token issued", body = TokenResponse),
        (status = 401, description = "Not logged in", body = ApiErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn regenerate_token(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Json<TokenResponse>> {
    let token = AccountStore::new(&state.db).issue_token(&account.id).await?;

    info!("Regenerated token for {}", account.id);
    Ok(Json(TokenResponse { token }))
}
