use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    groups::{
        dto::{AddMemberRequest, CreateGroupRequest, GroupDetails, UpdateGroupRequest},
        repo::GroupRepo,
        repo_types::Group,
        services,
    },
    state::AppState,
};

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/api/groups", post(create_group).get(list_groups))
        .route("/api/groups/:id", get(get_group).patch(update_group))
        .route("/api/groups/:id/members", post(add_member))
        .route("/api/groups/:id/leave", post(leave_group))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let group = services::create_group(state.store.as_ref(), user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Group>>> {
    Ok(Json(state.store.groups_for_member(user.id).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GroupDetails>> {
    Ok(Json(services::group_details(state.store.as_ref(), user.id, id).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGroupRequest>,
) -> ApiResult<Json<Group>> {
    Ok(Json(services::update_group(state.store.as_ref(), user.id, id, payload).await?))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<Json<Group>> {
    let group =
        services::add_member(state.store.as_ref(), user.id, id, payload.friend_link_id).await?;
    Ok(Json(group))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn leave_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    services::leave_group(state.store.as_ref(), user.id, id).await?;
    Ok(Json(json!({ "message": "Left group" })))
}
