use serde::{Deserialize, Serialize};

/// Provider-side payment intent as returned on creation.
///
/// Only `id` outlives the request; it is stored on the order under
/// [`INTENT_ID_META_KEY`](crate::models::INTENT_ID_META_KEY).
#[derive(Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("id", &self.id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// What the handoff knows about an intent: always the recorded id, and the
/// client secret only when the intent was created in this same request.
#[derive(Debug, Clone, Copy)]
pub struct IntentRef<'a> {
    pub id: &'a str,
    pub client_secret: Option<&'a str>,
}

impl<'a> IntentRef<'a> {
    pub fn recorded(id: &'a str) -> Self {
        Self {
            id,
            client_secret: None,
        }
    }
}

impl<'a> From<&'a PaymentIntent> for IntentRef<'a> {
    fn from(intent: &'a PaymentIntent) -> Self {
        Self {
            id: &intent.id,
            client_secret: Some(&intent.client_secret),
        }
    }
}

/// Parameters of a single intent-creation call.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub order_id: String,
}
