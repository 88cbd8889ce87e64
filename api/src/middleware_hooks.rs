use axum::{
    body::Body,
    extract::{OriginalUri, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use database::{
    Account, AccountStore, Channel, ChannelStore, Message, MessageStore, Role, RoleStore, Server,
    ServerStore,
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use validation::ErrorName;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Name of the version header added to every response
pub const VERSION_HEADER: &str = "x-parley-version";

/// The account behind the bearer token of the request
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Server named by the `server_id` path segment; the caller is a member
#[derive(Debug, Clone)]
pub struct ServerScope(pub Server);

/// Channel named by the `channel_id` path segment, inside the scoped server
#[derive(Debug, Clone)]
pub struct ChannelScope(pub Channel);

/// Message named by the `message_id` path segment, inside the scoped channel
#[derive(Debug, Clone)]
pub struct MessageScope(pub Message);

/// Role named by the `role_id` path segment, inside the scoped server
#[derive(Debug, Clone)]
pub struct RoleScope(pub Role);

/// Extract the token of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication middleware
///
/// Resolves the bearer token to an account and stores it as a
/// [`CurrentAccount`] extension. Missing or unknown tokens are rejected
/// with LOGGED_OUT.
pub async fn require_account(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!("AUTH MIDDLEWARE: No bearer token on {}", request.uri());
        return Err(ErrorName::LoggedOut.into());
    };

    let account = AccountStore::new(&state.db)
        .account_for_token(token)
        .await?
        .ok_or_else(|| {
            warn!("AUTH MIDDLEWARE: Unknown token presented for {}", request.uri());
            ApiError::named(ErrorName::LoggedOut)
        })?;

    debug!("AUTH MIDDLEWARE: Request authenticated as {}", account.id);
    request.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(request).await)
}

/// Scope resolution middleware
///
/// Looks up the server, channel, message and role named by the route's
/// path segments, in that order, and stores each as an extension. The
/// caller must be a member of the server.
pub async fn resolve_scope(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    let account = current_account(&request)?;

    let Some(server_id) = params.get("server_id") else {
        return Ok(next.run(request).await);
    };

    let server = ServerStore::new(&state.db)
        .find(server_id)
        .await?
        .ok_or_else(|| ApiError::named(ErrorName::Server404))?;

    if !ServerStore::new(&state.db)
        .is_member(&server.id, &account.id)
        .await?
    {
        return Err(ErrorName::NotInServer.into());
    }

    if let Some(channel_id) = params.get("channel_id") {
        let channel = ChannelStore::new(&state.db)
            .find(&server.id, channel_id)
            .await?
            .ok_or_else(|| ApiError::named(ErrorName::Channel404))?;

        if let Some(message_id) = params.get("message_id") {
            let message = MessageStore::new(&state.db)
                .find(&channel.id, message_id)
                .await?
                .ok_or_else(|| ApiError::named(ErrorName::Message404))?;
            request.extensions_mut().insert(MessageScope(message));
        }

        request.extensions_mut().insert(ChannelScope(channel));
    }

    if let Some(role_id) = params.get("role_id") {
        let role = RoleStore::new(&state.db)
            .find(&server.id, role_id)
            .await?
            .ok_or_else(|| ApiError::named(ErrorName::Role404))?;
        request.extensions_mut().insert(RoleScope(role));
    }

    request.extensions_mut().insert(ServerScope(server));

    Ok(next.run(request).await)
}

/// Owner guard middleware
///
/// Runs after [`resolve_scope`] and rejects callers that do not own the
/// scoped server with NOT_OWNER.
pub async fn require_owner(request: Request<Body>, next: Next) -> ApiResult<Response> {
    let account = current_account(&request)?;
    let server = request
        .extensions()
        .get::<ServerScope>()
        .ok_or_else(|| ApiError::Internal("owner guard used without a server scope".into()))?;

    if server.0.owner_id != account.id {
        warn!(
            "OWNER GUARD: {} is not the owner of server {}",
            account.id, server.0.id
        );
        return Err(ErrorName::NotOwner.into());
    }

    Ok(next.run(request).await)
}

fn current_account(request: &Request<Body>) -> ApiResult<Account> {
    request
        .extensions()
        .get::<CurrentAccount>()
        .map(|current| current.0.clone())
        .ok_or_else(|| ApiError::named(ErrorName::LoggedOut))
}

/// Request processing middleware hook
///
/// Times the request and hands the duration to the performance reporter.
pub async fn request_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let start = Instant::now();

    info!("REQUEST MIDDLEWARE: Processing incoming {} request to {}", method, path);

    let response = next.run(request).await;

    let duration = start.elapsed();
    debug!("REQUEST MIDDLEWARE: Request processed in {:?}", duration);

    state
        .reporter
        .record(&state.db, method.as_str(), &path, duration)
        .await;

    response
}

/// Response processing middleware hook
pub async fn response_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        VERSION_HEADER,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );

    response
}
