pub mod admin;
pub mod public;

use axum::Router;

use crate::db::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .merge(admin::router(state))
}
