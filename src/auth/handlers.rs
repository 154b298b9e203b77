use axum::{routing::get, Json, Router};
use tracing::instrument;

use crate::{auth::extractors::CurrentUser, state::AppState};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
