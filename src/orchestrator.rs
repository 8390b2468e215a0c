//! Creates a provider payment intent for an order and records it.
//!
//! An intent is only returned once its id has been durably written to the
//! order's metadata. If the write fails the intent is dropped: the shopper
//! never sees a client secret the shop cannot reconcile.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::models::{CreateIntentRequest, INTENT_ID_META_KEY, Order, PaymentIntent};
use crate::orders::OrderRepository;
use crate::payments::PaymentProvider;

#[derive(Clone)]
pub struct IntentOrchestrator {
    provider: Arc<dyn PaymentProvider>,
    orders: Arc<dyn OrderRepository>,
}

impl IntentOrchestrator {
    pub fn new(provider: Arc<dyn PaymentProvider>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { provider, orders }
    }

    /// Build the provider request for an order, validating amount and currency.
    pub fn intent_request(order: &Order) -> Result<CreateIntentRequest> {
        if order.total <= Decimal::ZERO {
            return Err(AppError::BadRequest(format!(
                "Order total must be positive, got {}",
                order.total
            )));
        }

        let amount = order.currency.to_minor_units(order.total)?;
        if amount <= 0 {
            return Err(AppError::BadRequest(format!(
                "Order total {} {} rounds to zero",
                order.total, order.currency
            )));
        }

        Ok(CreateIntentRequest {
            amount,
            currency: order.currency.provider_code(),
            description: order.description(),
            order_id: order.id.clone(),
        })
    }

    /// Create an intent and persist its id on the order.
    ///
    /// Each call creates a new intent; repeated calls for one order are not
    /// deduplicated here.
    pub async fn create_intent(&self, order: &Order, secret_key: &str) -> Result<PaymentIntent> {
        let request = Self::intent_request(order)?;

        let intent = self.provider.create_intent(secret_key, &request).await?;

        tracing::info!(
            "{} intent created: order={}, intent={}, amount={} {}",
            self.provider.name(),
            order.id,
            intent.id,
            request.amount,
            request.currency
        );

        if let Err(e) = self.orders.set_meta(&order.id, INTENT_ID_META_KEY, &intent.id) {
            tracing::error!(
                "Dropping intent {} for order {}: metadata write failed: {}",
                intent.id,
                order.id,
                e
            );
            return Err(match e {
                e @ AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            });
        }

        Ok(intent)
    }
}
