use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::currency::Currency;

/// Metadata key under which the provider's intent id is recorded.
pub const INTENT_ID_META_KEY: &str = "stripe_intent_id";

/// Metadata key the completion flow stores the widget's token under.
pub const PAYMENT_TOKEN_META_KEY: &str = "payment_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment; the only state checkout accepts
    Pending,
    /// Token received, handed to the completion flow
    Processing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub total: Decimal,
    pub currency: Currency,
    pub billing_email: String,
    pub status: OrderStatus,
    pub metadata: BTreeMap<String, String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn intent_id(&self) -> Option<&str> {
        self.metadata
            .get(INTENT_ID_META_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Shopper-facing description, e.g. "Order #42".
    pub fn description(&self) -> String {
        format!("Order #{}", self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub total: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub billing_email: String,
}
