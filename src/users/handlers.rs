use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    state::AppState,
    users::{
        dto::{AccountResponse, AccountUpdate, PublicProfile, UsernameQuery},
        services,
    },
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/account", get(get_account).put(update_account))
        .route("/api/users/by-username", get(by_username))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_account(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<AccountResponse>> {
    let profile = services::load_profile(state.store.as_ref(), user.id).await?;
    Ok(Json(AccountResponse {
        user: profile.into(),
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_account(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AccountUpdate>,
) -> ApiResult<Json<AccountResponse>> {
    let profile = services::update_account(state.store.as_ref(), user.id, payload).await?;
    Ok(Json(AccountResponse {
        user: profile.into(),
    }))
}

#[instrument(skip(state, _user))]
pub async fn by_username(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<UsernameQuery>,
) -> ApiResult<Json<PublicProfile>> {
    let profile = services::find_by_username(state.store.as_ref(), &query.username).await?;
    Ok(Json(profile.into()))
}
