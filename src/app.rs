//! Wiring: builds the shared state and the HTTP router from a `Config`.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::crypto::MasterKey;
use crate::db::{AppState, DbPool};
use crate::error::Result;
use crate::gateway::{CardGateway, GatewayRegistry};
use crate::handlers;
use crate::orchestrator::IntentOrchestrator;
use crate::orders::SqliteOrderRepository;
use crate::payments::StripeClient;
use crate::render::Renderer;
use crate::settings::SqliteSettingsStore;

/// Register the built-in gateways and assemble application state.
pub fn build_state(config: &Config, db: DbPool, master_key: MasterKey) -> Result<AppState> {
    let renderer = Arc::new(Renderer::new(&config.widget_script_url)?);
    let orders = Arc::new(SqliteOrderRepository::new(db.clone()));
    let settings = Arc::new(SqliteSettingsStore::new(db.clone(), master_key.clone()));
    let provider = Arc::new(StripeClient::new(
        &config.provider_api_base,
        config.provider_timeout,
    )?);

    let mut gateways = GatewayRegistry::new();
    gateways.register(Arc::new(CardGateway::new(
        settings,
        orders.clone(),
        IntentOrchestrator::new(provider, orders),
        renderer,
        &config.merchant_name,
        &config.base_url,
    )));

    Ok(AppState {
        db,
        audit_log_enabled: config.audit_log_enabled,
        master_key,
        admin_api_key: config.admin_api_key.clone(),
        gateways: Arc::new(gateways),
    })
}

pub fn router(state: AppState) -> Router {
    handlers::router(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
