//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use rust_decimal::Decimal;
use tempfile::TempDir;
use tower::ServiceExt;

pub use payhand::db::{AppState, queries};
use payhand::app;
use payhand::config::Config;
use payhand::crypto::MasterKey;
use payhand::currency::Currency;
use payhand::models::{CreateOrder, MerchantConfig, Order};

pub const ADMIN_KEY: &str = "test-admin-key";
pub const TEST_SECRET: &str = "sk_test_abc123xyz789";
pub const TEST_PUBLIC: &str = "pk_test_abc123xyz789";
pub const LIVE_SECRET: &str = "sk_live_def456uvw012";
pub const LIVE_PUBLIC: &str = "pk_live_def456uvw012";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub master_key: MasterKey,
    // Keeps the database file alive for the test's duration
    _dir: TempDir,
}

pub fn test_master_key() -> MasterKey {
    MasterKey::from_base64("MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=").unwrap()
}

pub fn test_config(provider_api_base: &str) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 3000,
        database_path: String::new(),
        base_url: "http://localhost:3000".into(),
        dev_mode: true,
        master_key: None,
        admin_api_key: Some(ADMIN_KEY.into()),
        provider_api_base: provider_api_base.to_string(),
        provider_timeout: Duration::from_secs(2),
        merchant_name: "Test Shop".into(),
        widget_script_url: "https://checkout.stripe.com/checkout.js".into(),
        audit_log_enabled: true,
    }
}

pub fn test_app(provider_api_base: &str) -> TestApp {
    test_app_with_config(test_config(provider_api_base))
}

pub fn test_app_with_config(mut config: Config) -> TestApp {
    let dir = TempDir::new().unwrap();
    config.database_path = dir.path().join("test.db").to_string_lossy().into_owned();

    let pool = payhand::db::create_pool(&config.database_path).unwrap();
    {
        let conn = pool.get().unwrap();
        payhand::db::init_db(&conn).unwrap();
    }

    let master_key = test_master_key();
    let state = app::build_state(&config, pool, master_key.clone()).unwrap();
    let router = app::router(state.clone());

    TestApp {
        state,
        router,
        master_key,
        _dir: dir,
    }
}

pub fn full_merchant_config(test_mode: bool) -> MerchantConfig {
    MerchantConfig {
        enabled: true,
        test_mode,
        live_secret_key: LIVE_SECRET.into(),
        live_public_key: LIVE_PUBLIC.into(),
        test_secret_key: TEST_SECRET.into(),
        test_public_key: TEST_PUBLIC.into(),
    }
}

impl TestApp {
    pub fn save_settings(&self, config: &MerchantConfig) {
        let conn = self.state.db.get().unwrap();
        queries::save_merchant_config(&conn, config, &self.master_key).unwrap();
    }

    pub fn create_order(&self, total: Decimal, currency: &str, email: &str) -> Order {
        let conn = self.state.db.get().unwrap();
        queries::create_order(
            &conn,
            &CreateOrder {
                total,
                currency: Currency::parse(currency).unwrap(),
                billing_email: email.to_string(),
            },
        )
        .unwrap()
    }

    pub fn order(&self, id: &str) -> Order {
        let conn = self.state.db.get().unwrap();
        queries::get_order(&conn, id).unwrap().unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
