use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    store::Store,
    users::{
        dto::AccountUpdate,
        repo::UserRepo,
        repo_types::{ProfileUpdate, UserProfile},
    },
};

lazy_static! {
    static ref CURRENCY_RE: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
}

pub fn is_valid_currency(code: &str) -> bool {
    CURRENCY_RE.is_match(code)
}

pub async fn load_profile(store: &dyn Store, user_id: Uuid) -> ApiResult<UserProfile> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[instrument(skip(store, payload))]
pub async fn update_account(
    store: &dyn Store,
    user_id: Uuid,
    payload: AccountUpdate,
) -> ApiResult<UserProfile> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    let currency = payload.display_currency.trim();
    if !is_valid_currency(currency) {
        warn!(currency, "invalid display currency");
        return Err(ApiError::bad_request(
            "Display currency must be a three-letter code like USD",
        ));
    }
    if let Some(other) = store.find_user_by_username(username).await? {
        if other.id != user_id {
            return Err(ApiError::Conflict("Username is already taken".into()));
        }
    }

    let update = ProfileUpdate {
        name: payload.full_name.trim().to_string(),
        username: username.to_string(),
        phone_number: payload
            .phone_number
            .map(|p| p.trim().to_string())
            .unwrap_or_default(),
        display_currency: currency.to_string(),
    };
    let profile = store
        .update_user(user_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!("account updated");
    Ok(profile)
}

pub async fn find_by_username(store: &dyn Store, username: &str) -> ApiResult<UserProfile> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is required"));
    }
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found("No user found with that username"))
}
