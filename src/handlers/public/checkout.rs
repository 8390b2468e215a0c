use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
};
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::{Form, Json, Path, Query};
use crate::gateway::{CardGateway, GatewayInfo, PaymentGateway, PaymentResult};
use crate::handoff::{CheckoutSubmission, WidgetParams};

#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    /// Gateway id; defaults to the card gateway
    #[serde(default)]
    pub gateway: Option<String>,
}

impl GatewayQuery {
    fn id(&self) -> &str {
        self.gateway.as_deref().unwrap_or(CardGateway::ID)
    }
}

fn available_gateway(state: &AppState, id: &str) -> Result<Arc<dyn PaymentGateway>> {
    state
        .gateways
        .available(id)?
        .ok_or_else(|| AppError::NotFound("Payment method not available".into()))
}

pub async fn list_gateways(State(state): State<AppState>) -> Json<Vec<GatewayInfo>> {
    Json(state.gateways.list_available())
}

/// Checkout submission: create and record an intent, then redirect the
/// shopper to the receipt page. Always answers in the
/// `{result: "success"|"failure"}` shape the checkout page expects.
pub async fn process_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<GatewayQuery>,
) -> (StatusCode, Json<PaymentResult>) {
    let outcome = match available_gateway(&state, query.id()) {
        Ok(gateway) => gateway.process_payment(&order_id).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!("Checkout failed for order {}: {}", order_id, e);
            } else {
                tracing::warn!("Checkout failed for order {}: {}", order_id, e);
            }
            (e.status(), Json(PaymentResult::from_error(&e)))
        }
    }
}

/// Create and record an intent and return widget parameters, client secret
/// included, for pages that drive the widget themselves.
pub async fn start_checkout(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<GatewayQuery>,
) -> Result<Json<WidgetParams>> {
    let gateway = available_gateway(&state, query.id())?;
    let params = gateway.start_checkout(&order_id).await?;
    Ok(Json(params))
}

pub async fn render_receipt(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<GatewayQuery>,
) -> Result<Html<String>> {
    let gateway = available_gateway(&state, query.id())?;
    Ok(Html(gateway.render_receipt(&order_id)?))
}

pub async fn complete_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Query(query): Query<GatewayQuery>,
    Form(submission): Form<CheckoutSubmission>,
) -> Result<Redirect> {
    let gateway = available_gateway(&state, query.id())?;
    match gateway.complete_payment(&order_id, &submission)? {
        PaymentResult::Success { redirect } => Ok(Redirect::to(&redirect)),
        PaymentResult::Failure { message, .. } => Err(AppError::BadRequest(message)),
    }
}
