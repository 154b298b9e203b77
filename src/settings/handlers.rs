use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    settings::{repo_types::SettingsValues, services},
    state::AppState,
};

pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).post(update_settings))
}

#[derive(Debug, Serialize)]
pub struct SettingsSaved {
    pub message: &'static str,
    pub settings: SettingsValues,
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SettingsValues>> {
    let row = services::load_or_create(state.store.as_ref(), user.id).await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<SettingsValues>,
) -> ApiResult<Json<SettingsSaved>> {
    let row = services::save(state.store.as_ref(), user.id, &payload).await?;
    Ok(Json(SettingsSaved {
        message: "settings updated",
        settings: row.into(),
    }))
}
