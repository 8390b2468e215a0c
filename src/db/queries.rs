use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::crypto::MasterKey;
use crate::error::Result;
use crate::models::*;

use super::from_row::{AUDIT_LOG_COLS, ORDER_COLS, query_all, query_one};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Merchant settings ============

/// Load the gateway settings, decrypting secret keys.
/// Returns the plugin defaults when the merchant has never saved settings.
pub fn get_merchant_config(conn: &Connection, master_key: &MasterKey) -> Result<MerchantConfig> {
    let row = conn
        .query_row(
            "SELECT enabled, test_mode, live_secret_key, live_public_key,
                    test_secret_key, test_public_key
             FROM merchant_settings WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((enabled, test_mode, live_secret, live_public_key, test_secret, test_public_key)) = row
    else {
        return Ok(MerchantConfig::default());
    };

    let decrypt = |stored: Option<String>| -> Result<String> {
        match stored {
            Some(s) => master_key.decrypt(&s),
            None => Ok(String::new()),
        }
    };

    Ok(MerchantConfig {
        enabled,
        test_mode,
        live_secret_key: decrypt(live_secret)?,
        live_public_key,
        test_secret_key: decrypt(test_secret)?,
        test_public_key,
    })
}

/// Persist the gateway settings. Secret keys are encrypted; empty keys are
/// stored as NULL.
pub fn save_merchant_config(
    conn: &Connection,
    config: &MerchantConfig,
    master_key: &MasterKey,
) -> Result<()> {
    let encrypt = |key: &str| -> Result<Option<String>> {
        if key.is_empty() {
            Ok(None)
        } else {
            master_key.encrypt(key).map(Some)
        }
    };

    conn.execute(
        "INSERT INTO merchant_settings
            (id, enabled, test_mode, live_secret_key, live_public_key,
             test_secret_key, test_public_key, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            enabled = excluded.enabled,
            test_mode = excluded.test_mode,
            live_secret_key = excluded.live_secret_key,
            live_public_key = excluded.live_public_key,
            test_secret_key = excluded.test_secret_key,
            test_public_key = excluded.test_public_key,
            updated_at = excluded.updated_at",
        params![
            config.enabled,
            config.test_mode,
            encrypt(&config.live_secret_key)?,
            &config.live_public_key,
            encrypt(&config.test_secret_key)?,
            &config.test_public_key,
            now(),
        ],
    )?;
    Ok(())
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO orders (id, total, currency, billing_email, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            input.total.to_string(),
            input.currency.code(),
            &input.billing_email,
            OrderStatus::Pending.as_ref(),
            now,
            now
        ],
    )?;

    Ok(Order {
        id,
        total: input.total,
        currency: input.currency.clone(),
        billing_email: input.billing_email.clone(),
        status: OrderStatus::Pending,
        metadata: BTreeMap::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Get an order with its metadata.
pub fn get_order(conn: &Connection, id: &str) -> Result<Option<Order>> {
    let order: Option<Order> = query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )?;

    match order {
        Some(mut order) => {
            order.metadata = get_order_meta(conn, id)?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

pub fn get_order_meta(conn: &Connection, order_id: &str) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn.prepare(
        "SELECT meta_key, meta_value FROM order_meta WHERE order_id = ?1 ORDER BY meta_key",
    )?;
    let rows = stmt.query_map(params![order_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
}

/// Set one metadata key on an order in its own committed transaction.
/// Returns false if the order does not exist.
pub fn set_order_meta(conn: &Connection, order_id: &str, key: &str, value: &str) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let now = now();

    let exists = tx
        .query_row("SELECT 1 FROM orders WHERE id = ?1", params![order_id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Ok(false);
    }

    tx.execute(
        "INSERT INTO order_meta (order_id, meta_key, meta_value, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(order_id, meta_key) DO UPDATE SET
            meta_value = excluded.meta_value,
            updated_at = excluded.updated_at",
        params![order_id, key, value, now],
    )?;
    tx.execute(
        "UPDATE orders SET updated_at = ?1 WHERE id = ?2",
        params![now, order_id],
    )?;
    tx.commit()?;
    Ok(true)
}

/// Move a pending order to processing and record the widget token.
/// Returns false if the order is missing or no longer pending.
pub fn complete_order_payment(conn: &Connection, order_id: &str, token: &str) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let now = now();

    let updated = tx.execute(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![
            OrderStatus::Processing.as_ref(),
            now,
            order_id,
            OrderStatus::Pending.as_ref()
        ],
    )?;
    if updated == 0 {
        return Ok(false);
    }

    tx.execute(
        "INSERT INTO order_meta (order_id, meta_key, meta_value, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(order_id, meta_key) DO UPDATE SET
            meta_value = excluded.meta_value,
            updated_at = excluded.updated_at",
        params![order_id, PAYMENT_TOKEN_META_KEY, token, now],
    )?;
    tx.commit()?;
    Ok(true)
}

// ============ Audit logs ============

pub fn create_audit_log(
    conn: &Connection,
    action: &str,
    resource_type: &str,
    resource_id: &str,
    details: Option<&serde_json::Value>,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> Result<AuditLog> {
    let id = gen_id();
    let timestamp = now();
    let details_json = details.map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO audit_logs
            (id, timestamp, action, resource_type, resource_id, details, ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            timestamp,
            action,
            resource_type,
            resource_id,
            &details_json,
            ip_address,
            user_agent
        ],
    )?;

    Ok(AuditLog {
        id,
        timestamp,
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
        details: details.cloned(),
        ip_address: ip_address.map(String::from),
        user_agent: user_agent.map(String::from),
    })
}

/// Most recent audit entries first, optionally filtered.
pub fn query_audit_logs(conn: &Connection, query: &AuditLogQuery) -> Result<Vec<AuditLog>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);
    let action = query.action.as_deref();
    let resource_id = query.resource_id.as_deref();

    query_all(
        conn,
        &format!(
            "SELECT {} FROM audit_logs
             WHERE (?1 IS NULL OR action = ?1)
               AND (?2 IS NULL OR resource_id = ?2)
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?3",
            AUDIT_LOG_COLS
        ),
        &[&action, &resource_id, &limit],
    )
}
