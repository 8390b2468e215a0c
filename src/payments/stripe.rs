use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{CreateIntentRequest, PaymentIntent};

use super::PaymentProvider;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct CreateIntentResponse {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    code: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl StripeClient {
    /// `api_base` is the provider origin, e.g. `https://api.stripe.com`.
    /// `timeout` bounds the whole call including reading the response.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::ProviderUnavailable(format!(
                "Stripe did not respond within {}s",
                self.timeout.as_secs()
            ))
        } else {
            AppError::ProviderUnavailable(format!("Stripe API error: {}", e))
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_intent(
        &self,
        secret_key: &str,
        request: &CreateIntentRequest,
    ) -> Result<PaymentIntent> {
        let form = vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("description", request.description.clone()),
            ("metadata[order_id]", request.order_id.clone()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::ProviderUnavailable(format!(
                "Stripe returned {}",
                status
            )));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                "Stripe refused the merchant secret key for order {} ({}): {}",
                request.order_id,
                status,
                body
            );
            return Err(AppError::Configuration(
                "Stripe rejected the configured secret key".into(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<StripeErrorResponse>(&body) {
                Ok(parsed) => (
                    parsed
                        .error
                        .code
                        .or(parsed.error.error_type)
                        .unwrap_or_else(|| format!("http_{}", status.as_u16())),
                    parsed
                        .error
                        .message
                        .unwrap_or_else(|| "The payment was declined.".to_string()),
                ),
                Err(_) => (format!("http_{}", status.as_u16()), body),
            };
            tracing::warn!(
                "Stripe rejected payment intent for order {}: {} ({})",
                request.order_id,
                code,
                message
            );
            return Err(AppError::ProviderRejected { code, message });
        }

        let created: CreateIntentResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;

        let client_secret = created.client_secret.ok_or_else(|| {
            AppError::ProviderUnavailable("Stripe response is missing client_secret".into())
        })?;

        Ok(PaymentIntent {
            id: created.id,
            client_secret,
        })
    }
}
