//! Payment-gateway extension point.
//!
//! Gateways are registered explicitly at startup into a [`GatewayRegistry`];
//! checkout only ever sees gateways that report themselves available, so a
//! disabled gateway is skipped and checkout falls through to the others.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::handoff::{CheckoutSubmission, WidgetParams, build_widget_params};
use crate::models::{Credentials, IntentRef, Order, OrderStatus};
use crate::orchestrator::IntentOrchestrator;
use crate::orders::OrderRepository;
use crate::render::{ReceiptContext, Renderer};
use crate::settings::SettingsStore;

#[derive(Debug, Clone, Serialize)]
pub struct GatewayInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub supports: &'static [&'static str],
}

/// Outcome reported back to the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PaymentResult {
    Success { redirect: String },
    Failure { message: String, retryable: bool },
}

impl PaymentResult {
    pub fn from_error(e: &AppError) -> Self {
        PaymentResult::Failure {
            message: e.shopper_message(),
            retryable: e.is_retryable(),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn info(&self) -> GatewayInfo;

    /// Whether checkout should offer this gateway at all.
    fn is_available(&self) -> Result<bool>;

    /// Create and record an intent, then send the shopper to the receipt page.
    async fn process_payment(&self, order_id: &str) -> Result<PaymentResult>;

    /// Create and record an intent and return the widget parameters directly,
    /// including the client secret.
    async fn start_checkout(&self, order_id: &str) -> Result<WidgetParams>;

    /// Receipt-page fragment that opens the hosted widget for the recorded intent.
    fn render_receipt(&self, order_id: &str) -> Result<String>;

    /// Accept the token posted back by the widget.
    fn complete_payment(
        &self,
        order_id: &str,
        submission: &CheckoutSubmission,
    ) -> Result<PaymentResult>;
}

#[derive(Default)]
pub struct GatewayRegistry {
    gateways: Vec<Arc<dyn PaymentGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        tracing::debug!("Registered payment gateway {}", gateway.info().id);
        self.gateways.push(gateway);
    }

    /// Look up a gateway by id, only if it is currently available.
    pub fn available(&self, id: &str) -> Result<Option<Arc<dyn PaymentGateway>>> {
        let Some(gateway) = self.gateways.iter().find(|g| g.info().id == id) else {
            return Ok(None);
        };
        if gateway.is_available()? {
            Ok(Some(gateway.clone()))
        } else {
            Ok(None)
        }
    }

    /// All gateways checkout may offer, in registration order.
    pub fn list_available(&self) -> Vec<GatewayInfo> {
        self.gateways
            .iter()
            .filter(|g| match g.is_available() {
                Ok(available) => available,
                Err(e) => {
                    tracing::warn!("Skipping gateway {}: {}", g.info().id, e);
                    false
                }
            })
            .map(|g| g.info())
            .collect()
    }
}

/// Card payments through the provider's hosted widget.
pub struct CardGateway {
    settings: Arc<dyn SettingsStore>,
    orders: Arc<dyn OrderRepository>,
    orchestrator: IntentOrchestrator,
    renderer: Arc<Renderer>,
    merchant_name: String,
    base_url: String,
}

impl CardGateway {
    pub const ID: &'static str = "stripe";

    pub fn new(
        settings: Arc<dyn SettingsStore>,
        orders: Arc<dyn OrderRepository>,
        orchestrator: IntentOrchestrator,
        renderer: Arc<Renderer>,
        merchant_name: &str,
        base_url: &str,
    ) -> Self {
        Self {
            settings,
            orders,
            orchestrator,
            renderer,
            merchant_name: merchant_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn receipt_url(&self, order_id: &str) -> String {
        format!("{}/checkout/{}/pay", self.base_url, urlencoding::encode(order_id))
    }

    fn complete_url(&self, order_id: &str) -> String {
        format!("{}/checkout/{}/complete", self.base_url, urlencoding::encode(order_id))
    }

    fn order_received_url(&self, order_id: &str) -> String {
        format!("{}/orders/{}", self.base_url, urlencoding::encode(order_id))
    }

    /// Load settings and resolve the active key pair. A disabled gateway
    /// stops here, before anything reaches the orchestrator.
    fn credentials(&self) -> Result<Credentials> {
        let config = self.settings.load()?;
        if !config.enabled {
            return Err(AppError::BadRequest("This payment method is disabled".into()));
        }
        config.resolve_credentials()
    }

    fn pending_order(&self, order_id: &str) -> Result<Order> {
        let order = self
            .orders
            .get_order(order_id)?
            .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::BadRequest("Order is not awaiting payment".into()));
        }
        Ok(order)
    }
}

#[async_trait]
impl PaymentGateway for CardGateway {
    fn info(&self) -> GatewayInfo {
        GatewayInfo {
            id: Self::ID,
            title: "Stripe",
            description: "Pay with Stripe",
            supports: &["products"],
        }
    }

    fn is_available(&self) -> Result<bool> {
        Ok(self.settings.load()?.enabled)
    }

    async fn process_payment(&self, order_id: &str) -> Result<PaymentResult> {
        let credentials = self.credentials()?;
        let order = self.pending_order(order_id)?;

        let intent = self
            .orchestrator
            .create_intent(&order, &credentials.secret_key)
            .await?;
        tracing::debug!("Order {} will pay intent {}", order.id, intent.id);

        Ok(PaymentResult::Success {
            redirect: self.receipt_url(&order.id),
        })
    }

    async fn start_checkout(&self, order_id: &str) -> Result<WidgetParams> {
        let credentials = self.credentials()?;
        let order = self.pending_order(order_id)?;

        let intent = self
            .orchestrator
            .create_intent(&order, &credentials.secret_key)
            .await?;

        build_widget_params(&order, (&intent).into(), &credentials, &self.merchant_name)
    }

    fn render_receipt(&self, order_id: &str) -> Result<String> {
        let credentials = self.credentials()?;
        let order = self.pending_order(order_id)?;
        let intent_id = order
            .intent_id()
            .ok_or_else(|| AppError::BadRequest("No payment started for this order".into()))?;

        let params = build_widget_params(
            &order,
            IntentRef::recorded(intent_id),
            &credentials,
            &self.merchant_name,
        )?;
        let complete_url = self.complete_url(&order.id);

        self.renderer.receipt(
            &params,
            &ReceiptContext {
                complete_url: &complete_url,
            },
        )
    }

    fn complete_payment(
        &self,
        order_id: &str,
        submission: &CheckoutSubmission,
    ) -> Result<PaymentResult> {
        let token = submission.token()?;
        let order = self.pending_order(order_id)?;
        let intent_id = order
            .intent_id()
            .ok_or_else(|| AppError::BadRequest("No payment started for this order".into()))?;

        if !self.orders.complete_payment(&order.id, token)? {
            return Err(AppError::BadRequest("Order is not awaiting payment".into()));
        }

        tracing::info!(
            "Payment token received: order={}, intent={}",
            order.id,
            intent_id
        );

        Ok(PaymentResult::Success {
            redirect: self.order_received_url(&order.id),
        })
    }
}
