mod checkout;
mod orders;

pub use checkout::*;
pub use orders::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/gateways", get(list_gateways))
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/checkout/{order_id}", post(process_payment))
        .route("/checkout/{order_id}/intent", post(start_checkout))
        .route("/checkout/{order_id}/pay", get(render_receipt))
        .route("/checkout/{order_id}/complete", post(complete_payment))
}
