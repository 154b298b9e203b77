use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    inbox::{
        repo::InboxRepo,
        repo_types::Notification,
        services::{self, NotificationAction, ThreadSummary},
    },
    state::AppState,
};

pub fn inbox_routes() -> Router<AppState> {
    Router::new()
        .route("/inbox/notifications", get(list_notifications))
        .route("/inbox/notifications/action", post(act_on_notification))
        .route("/inbox/data", get(inbox_data))
}

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub notification: Notification,
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.store.pending_notifications(user.id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn act_on_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NotificationAction>,
) -> ApiResult<Json<ActionResult>> {
    let notification = services::act_on(state.store.as_ref(), user.id, &payload).await?;
    Ok(Json(ActionResult {
        success: true,
        notification,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn inbox_data(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ThreadSummary>>> {
    let messages = state.store.messages_for(user.id).await?;
    Ok(Json(services::latest_per_thread(messages)))
}
