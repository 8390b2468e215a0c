//! End-to-end checkout: process payment, render the receipt widget, post the
//! token back. The payment provider is a wiremock server.

use std::time::Duration;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

use payhand::models::{INTENT_ID_META_KEY, OrderStatus, PAYMENT_TOKEN_META_KEY};

fn intent_created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": id,
        "object": "payment_intent",
        "client_secret": format!("{}_secret_xyz", id),
        "status": "requires_payment_method"
    }))
}

#[tokio::test]
async fn test_usd_order_in_test_mode_creates_intent_and_renders_widget() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(header("authorization", format!("Bearer {}", TEST_SECRET).as_str()))
        .and(body_string_contains("amount=1999"))
        .and(body_string_contains("currency=usd"))
        .respond_with(intent_created("pi_1999"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "shopper@example.com");

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"], "success");
    assert_eq!(
        body["redirect"],
        format!("http://localhost:3000/checkout/{}/pay", order.id)
    );

    let stored = app.order(&order.id);
    assert_eq!(
        stored.metadata.get(INTENT_ID_META_KEY).map(String::as_str),
        Some("pi_1999")
    );

    let response = app.send(get(&format!("/checkout/{}/pay", order.id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains(TEST_PUBLIC));
    assert!(!html.contains(LIVE_PUBLIC));
    assert!(html.contains("pi_1999"));
    assert!(html.contains("1999"));
    // The receipt page only knows the recorded id, never the secret
    assert!(!html.contains("pi_1999_secret_xyz"));
    assert!(!html.contains(TEST_SECRET));
}

#[tokio::test]
async fn test_live_mode_uses_live_keys() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(header("authorization", format!("Bearer {}", LIVE_SECRET).as_str()))
        .respond_with(intent_created("pi_live"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(false));
    let order = app.create_order(dec!(5), "EUR", "a@example.com");

    let response = app
        .send(post(&format!("/checkout/{}/intent", order.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let params = body_json(response).await;
    assert_eq!(params["public_key"], LIVE_PUBLIC);
    assert_eq!(params["amount_minor"], 500);
}

#[tokio::test]
async fn test_start_checkout_returns_client_secret_only_after_recording() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(intent_created("pi_json"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "shopper@example.com");

    let response = app
        .send(post(&format!("/checkout/{}/intent", order.id)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let params = body_json(response).await;

    assert_eq!(params["client_secret"], "pi_json_secret_xyz");
    assert_eq!(params["intent_id"], "pi_json");
    assert_eq!(params["public_key"], TEST_PUBLIC);
    assert_eq!(params["amount_minor"], 1999);
    assert_eq!(params["currency"], "usd");
    assert_eq!(params["billing_email"], "shopper@example.com");
    assert_eq!(params["merchant_display_name"], "Test Shop");

    let stored = app.order(&order.id);
    assert_eq!(
        stored.metadata.get(INTENT_ID_META_KEY).map(String::as_str),
        Some("pi_json")
    );
}

#[tokio::test]
async fn test_zero_decimal_currency_is_sent_unscaled() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(body_string_contains("amount=500&"))
        .and(body_string_contains("currency=jpy"))
        .respond_with(intent_created("pi_jpy"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(500), "JPY", "a@example.com");

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_provider_timeout_is_unavailable_and_leaves_order_untouched() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(intent_created("pi_slow").set_delay(Duration::from_secs(3)))
        .mount(&provider)
        .await;

    let mut config = test_config(&provider.uri());
    config.provider_timeout = Duration::from_secs(1);
    let app = test_app_with_config(config);
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["result"], "failure");
    assert_eq!(body["retryable"], true);

    let stored = app.order(&order.id);
    assert!(stored.metadata.is_empty());
    assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_provider_rejection_surfaces_code_and_message() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "amount_too_small",
                "message": "Amount must be at least $0.50 usd",
                "type": "invalid_request_error"
            }
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(0.10), "USD", "a@example.com");

    let response = app
        .send(post(&format!("/checkout/{}/intent", order.id)))
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "amount_too_small");
    assert_eq!(body["details"], "Amount must be at least $0.50 usd");

    assert!(app.order(&order.id).metadata.is_empty());
}

#[tokio::test]
async fn test_invalid_secret_key_is_configuration_error() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Invalid API Key provided: sk_test_********z789",
                "type": "invalid_request_error"
            }
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["result"], "failure");
    assert_eq!(
        body["message"],
        "This payment method is not available right now."
    );
    assert_eq!(body["retryable"], false);
    assert!(!body.to_string().contains("sk_test"));

    assert!(app.order(&order.id).metadata.is_empty());
}

#[tokio::test]
async fn test_provider_server_error_is_unavailable() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(10), "USD", "a@example.com");

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_disabled_gateway_never_reaches_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(intent_created("pi_never"))
        .expect(0)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    let mut settings = full_merchant_config(true);
    settings.enabled = false;
    app.save_settings(&settings);
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let gateways = body_json(app.send(get("/gateways")).await).await;
    assert_eq!(gateways, json!([]));

    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["result"], "failure");

    let response = app
        .send(post(&format!("/checkout/{}/intent", order.id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(app.order(&order.id).metadata.is_empty());
}

#[tokio::test]
async fn test_enabled_gateway_is_listed() {
    let app = test_app("http://127.0.0.1:9");
    app.save_settings(&full_merchant_config(true));

    let gateways = body_json(app.send(get("/gateways")).await).await;
    assert_eq!(gateways[0]["id"], "stripe");
    assert_eq!(gateways[0]["title"], "Stripe");
    assert_eq!(gateways[0]["description"], "Pay with Stripe");
}

#[tokio::test]
async fn test_missing_credentials_block_checkout() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(intent_created("pi_never"))
        .expect(0)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    let mut settings = full_merchant_config(true);
    settings.test_secret_key.clear();
    app.save_settings(&settings);
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let response = app
        .send(post(&format!("/checkout/{}/intent", order.id)))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["details"], "missing credentials for test mode");
}

#[tokio::test]
async fn test_receipt_requires_recorded_intent() {
    let app = test_app("http://127.0.0.1:9");
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let response = app.send(get(&format!("/checkout/{}/pay", order.id))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_receipt_escapes_hostile_order_data() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(intent_created("pi_esc"))
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let hostile = r#""><script>alert('x')</script>&@example.com"#;
    let order = app.create_order(dec!(1), "USD", hostile);

    app.send(post(&format!("/checkout/{}", order.id))).await;
    let html = body_string(app.send(get(&format!("/checkout/{}/pay", order.id))).await).await;

    assert!(!html.contains("<script>alert"));
    assert!(!html.contains(r#""><script>"#));
    assert!(html.contains("&lt;script&gt;alert("));
}

#[tokio::test]
async fn test_token_post_back_completes_order() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(intent_created("pi_done"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = test_app(&provider.uri());
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");
    app.send(post(&format!("/checkout/{}", order.id))).await;

    let response = app
        .send(post_form(
            &format!("/checkout/{}/complete", order.id),
            "payment_token=tok_visa",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap(),
        format!("http://localhost:3000/orders/{}", order.id).as_str()
    );

    let stored = app.order(&order.id);
    assert_eq!(stored.status, OrderStatus::Processing);
    assert_eq!(
        stored.metadata.get(PAYMENT_TOKEN_META_KEY).map(String::as_str),
        Some("tok_visa")
    );

    // A second submission for the same order is refused
    let response = app
        .send(post_form(
            &format!("/checkout/{}/complete", order.id),
            "payment_token=tok_visa",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // And checkout will not create another intent for it
    let response = app.send(post(&format!("/checkout/{}", order.id))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_post_back_requires_token_and_intent() {
    let app = test_app("http://127.0.0.1:9");
    app.save_settings(&full_merchant_config(true));
    let order = app.create_order(dec!(19.99), "USD", "a@example.com");

    let response = app
        .send(post_form(
            &format!("/checkout/{}/complete", order.id),
            "payment_token=tok_visa",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(post_form(&format!("/checkout/{}/complete", order.id), "payment_token="))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.order(&order.id).status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = test_app("http://127.0.0.1:9");
    app.save_settings(&full_merchant_config(true));

    let response = app.send(post("/checkout/missing-order")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_orders_api_creates_and_reads_orders() {
    let app = test_app("http://127.0.0.1:9");

    let response = app
        .send(json_request(
            "POST",
            "/orders",
            &json!({"total": "19.99", "currency": "usd", "billing_email": "a@example.com"}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["currency"], "USD");
    assert_eq!(created["status"], "pending");

    let id = created["id"].as_str().unwrap();
    let fetched = body_json(app.send(get(&format!("/orders/{}", id))).await).await;
    assert_eq!(fetched["total"], "19.99");

    let response = app
        .send(json_request(
            "POST",
            "/orders",
            &json!({"total": "1", "currency": "dollars"}),
            None,
        ))
        .await;
    assert!(response.status().is_client_error());
}
