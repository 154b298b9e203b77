use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod ledger;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::history_routes())
        .merge(handlers::balance_routes())
}
