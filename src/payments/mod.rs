mod stripe;

pub use stripe::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CreateIntentRequest, PaymentIntent};

/// The payment provider's intent-creation endpoint.
///
/// Implementations perform exactly one outbound call per invocation and map
/// transport failures to `AppError::ProviderUnavailable` and refusals to
/// `AppError::ProviderRejected`.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_intent(
        &self,
        secret_key: &str,
        request: &CreateIntentRequest,
    ) -> Result<PaymentIntent>;
}
