//! Merchant settings: the gateway's enable switch, test mode, and the two
//! key pairs. Secret keys never leave the service unmasked.

use axum::{extract::State, http::HeaderMap};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::{MaskedMerchantConfig, UpdateMerchantConfig};
use crate::util::audit_log;

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<MaskedMerchantConfig>> {
    let conn = state.db.get()?;
    let config = queries::get_merchant_config(&conn, &state.master_key)?;
    Ok(Json(config.masked()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UpdateMerchantConfig>,
) -> Result<Json<MaskedMerchantConfig>> {
    let conn = state.db.get()?;
    let changed = input.changed_fields();

    let mut config = queries::get_merchant_config(&conn, &state.master_key)?;
    config.apply(input);
    queries::save_merchant_config(&conn, &config, &state.master_key)?;

    audit_log(
        &conn,
        state.audit_log_enabled,
        &headers,
        "update_settings",
        "merchant_settings",
        "default",
        Some(&serde_json::json!({
            "fields": changed,
            "enabled": config.enabled,
            "test_mode": config.test_mode,
        })),
    )?;

    tracing::info!(
        "Merchant settings updated: fields={:?}, enabled={}, mode={}",
        changed,
        config.enabled,
        config.mode()
    );

    Ok(Json(config.masked()))
}
