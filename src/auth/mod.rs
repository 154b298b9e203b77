use crate::state::AppState;
use axum::Router;

pub mod extractors;
pub mod handlers;
pub mod jwt;

pub use extractors::CurrentUser;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::me_routes())
}
