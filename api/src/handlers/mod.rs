use axum::Json;
use database::{Account, AccountStore};
use serde_json::Value as JsonValue;
use validation::ErrorName;

use crate::{
    error::ApiResult,
    models::{ProfileResponse, TargetProfileRequest},
    schemas::{self, parse_body},
    AppState,
};

pub mod auth;
pub mod channels;
pub mod friends;
pub mod health;
pub mod messages;
pub mod profiles;
pub mod roles;
pub mod servers;

/// Resolve the account named in a `{profile_id}` body
pub(crate) async fn target_account(
    state: &AppState,
    body: Option<Json<JsonValue>>,
) -> ApiResult<Account> {
    let req: TargetProfileRequest = parse_body(&schemas::TARGET_PROFILE, body)?;

    AccountStore::new(&state.db)
        .find_by_profile_id(&req.profile_id)
        .await?
        .ok_or_else(|| ErrorName::Account404.into())
}

/// Public profiles of `accounts` with their presence
pub(crate) async fn public_profiles(
    state: &AppState,
    accounts: Vec<Account>,
) -> Vec<ProfileResponse> {
    let mut profiles = Vec::with_capacity(accounts.len());
    for account in accounts {
        let online = state.presence.is_online(&account.id).await;
        profiles.push(ProfileResponse::public(account, online));
    }
    profiles
}
