//! Minimal order surface standing in for the shop platform.

use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateOrder, Order};

pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrder>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::create_order(&conn, &input)?;

    tracing::info!(
        "Created order {} for {} {}",
        order.id,
        order.total,
        order.currency
    );

    Ok(Json(order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order(&conn, &order_id)?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}
