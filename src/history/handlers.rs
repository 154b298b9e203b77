use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    expenses::repo::ExpenseRepo,
    groups::repo::GroupRepo,
    history::{
        dto::{
            Dashboard, GroupBalances, GroupNames, GroupRef, HistoryResponse, RecentTransaction,
            WalletTotals,
        },
        ledger::{self, EntryKind, HistoryFilter, Wallet},
        services::{display_names, first_name, load_ledger},
    },
    state::AppState,
};

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/api/history", get(get_history))
        .route("/api/history/groups", get(get_history_groups))
        .route("/api/dashboard", get(get_dashboard))
}

pub fn balance_routes() -> Router<AppState> {
    Router::new()
        .route("/balances", get(get_wallet))
        .route("/balances/:group_id", get(get_group_balances))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_history(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filter): Query<HistoryFilter>,
) -> ApiResult<Json<HistoryResponse>> {
    let ledger = load_ledger(state.store.as_ref(), user.id).await?;
    let entries = ledger::apply_filter(ledger.entries(), &filter);
    let (paid, received): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.kind == EntryKind::Paid);
    Ok(Json(HistoryResponse { received, paid }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_history_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<GroupNames>> {
    let ledger = load_ledger(state.store.as_ref(), user.id).await?;
    let mut groups: Vec<String> = ledger.group_names.into_values().filter(|n| !n.is_empty()).collect();
    groups.sort();
    groups.dedup();
    Ok(Json(GroupNames { groups }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    let store = state.store.as_ref();
    let user_name = first_name(store, &user).await?;
    let groups = store
        .groups_for_member(user.id)
        .await?
        .into_iter()
        .map(|g| GroupRef {
            id: g.id,
            name: g.name,
        })
        .collect();

    let entries = load_ledger(store, user.id).await?.entries();
    let Wallet {
        owed,
        owing,
        net,
        balance_class,
    } = ledger::wallet(&entries);
    let recent_transactions = ledger::recent(&entries, 5)
        .iter()
        .map(RecentTransaction::from)
        .collect();

    Ok(Json(Dashboard {
        user_name,
        wallet: WalletTotals { owed, owing },
        wallet_balance: net,
        balance_class,
        groups,
        recent_transactions,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_wallet(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Wallet>> {
    let entries = load_ledger(state.store.as_ref(), user.id).await?.entries();
    Ok(Json(ledger::wallet(&entries)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_group_balances(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<GroupBalances>> {
    let store = state.store.as_ref();
    let group = store
        .get_group(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;
    if !group.has_member(user.id) {
        return Err(ApiError::Forbidden("You are not a member of this group".into()));
    }

    let expenses = store.expenses_by_group(group_id).await?;
    let ids: Vec<Uuid> = expenses.iter().map(|e| e.id).collect();
    let participants = if ids.is_empty() {
        Vec::new()
    } else {
        store.participants_for_expenses(&ids).await?
    };

    let mut people: Vec<Uuid> = group.members.clone();
    people.extend(expenses.iter().map(|e| e.user_id));
    people.extend(participants.iter().map(|p| p.member_id));
    people.sort();
    people.dedup();
    let names = display_names(store, &people).await?;

    let balances = ledger::group_balances(&expenses, &participants, &group.members, &names);
    Ok(Json(GroupBalances {
        group_id,
        group_name: group.name,
        balances,
    }))
}
