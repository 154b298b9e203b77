use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiResult,
    expenses::{
        dto::{CreateExpenseRequest, CreatedExpense, ExpenseDetails, RecentQuery},
        repo::ExpenseRepo,
        repo_types::Expense,
        services,
    },
    history::{
        ledger::{self, HistoryEntry},
        services::load_ledger,
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/recent", get(recent_expenses))
        .route("/expenses/:id", get(get_expense))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<CreatedExpense>)> {
    let created = services::create_expense(state.store.as_ref(), user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Expense>>> {
    Ok(Json(state.store.expenses_by_creator(user.id).await?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn recent_expenses(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<RecentQuery>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let entries = load_ledger(state.store.as_ref(), user.id).await?.entries();
    Ok(Json(ledger::recent(&entries, q.limit)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ExpenseDetails>> {
    Ok(Json(services::expense_details(state.store.as_ref(), user.id, id).await?))
}
