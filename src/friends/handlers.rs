use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    friends::{
        dto::{AddFriendRequest, FriendAdded, FriendList, FriendQuery, FriendTags},
        services,
    },
    state::AppState,
};

pub fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/api/friends", get(list_friends).post(add_friend))
        .route("/api/friends/groups", get(list_tags))
        .route("/api/friends/:id", delete(remove_friend))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_friends(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FriendQuery>,
) -> ApiResult<Json<FriendList>> {
    let friends = services::list_friends(state.store.as_ref(), user.id, &query).await?;
    Ok(Json(FriendList { friends }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn add_friend(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AddFriendRequest>,
) -> ApiResult<(StatusCode, Json<FriendAdded>)> {
    let friend = services::add_friend(state.store.as_ref(), user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(FriendAdded {
            message: "Friend added",
            friend,
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_friend(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    services::remove_friend(state.store.as_ref(), user.id, id).await?;
    Ok(Json(json!({ "message": "Friend removed" })))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_tags(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<FriendTags>> {
    let groups = services::friend_tags(state.store.as_ref(), user.id).await?;
    Ok(Json(FriendTags { groups }))
}
