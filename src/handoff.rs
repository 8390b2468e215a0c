//! Data handed to the hosted payment widget, and the data it hands back.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Credentials, IntentRef, Order};

/// Everything the client-side widget needs to open for one order.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetParams {
    pub public_key: String,
    pub intent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub order_id: String,
    pub billing_email: String,
    pub merchant_display_name: String,
    pub description: String,
}

/// Assemble widget parameters. Pure: no I/O, no escaping (escaping is the
/// renderer's job and happens by construction there).
pub fn build_widget_params(
    order: &Order,
    intent: IntentRef<'_>,
    credentials: &Credentials,
    merchant_display_name: &str,
) -> Result<WidgetParams> {
    Ok(WidgetParams {
        public_key: credentials.public_key.clone(),
        intent_id: intent.id.to_string(),
        client_secret: intent.client_secret.map(String::from),
        amount_minor: order.currency.to_minor_units(order.total)?,
        currency: order.currency.provider_code(),
        order_id: order.id.clone(),
        billing_email: order.billing_email.clone(),
        merchant_display_name: merchant_display_name.to_string(),
        description: order.description(),
    })
}

/// Checkout form submission carrying the widget's token back.
#[derive(Debug, Deserialize)]
pub struct CheckoutSubmission {
    #[serde(default)]
    pub payment_token: String,
}

impl CheckoutSubmission {
    pub fn token(&self) -> Result<&str> {
        let token = self.payment_token.trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("payment_token is required".into()));
        }
        Ok(token)
    }
}
