mod audit_logs;
mod settings;

pub use audit_logs::*;
pub use settings::*;

use axum::{Router, middleware, routing::get};

use crate::db::AppState;
use crate::middleware::admin_auth;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/settings", get(get_settings).put(update_settings))
        .route("/admin/audit-logs", get(query_audit_logs))
        .layer(middleware::from_fn_with_state(state, admin_auth))
}
