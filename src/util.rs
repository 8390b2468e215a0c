//! Shared utility functions for the payhand service.

use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;

/// Extract client IP address and user-agent from request headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`,
/// and extracts the `user-agent` header for audit logging.
pub fn extract_request_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    (ip, user_agent)
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Mask a provider key for display: keep the `sk_test_` style prefix and,
/// for long keys, the last four characters. Empty keys mask to None.
pub fn mask_secret(key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let split = key.rfind('_').map(|i| i + 1).unwrap_or(0);
    let (prefix, rest) = key.split_at(split);
    if rest.chars().count() >= 12 {
        let tail = rest
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| &rest[i..])
            .unwrap_or(rest);
        Some(format!("{}...{}", prefix, tail))
    } else {
        Some(format!("{}****", prefix))
    }
}

/// Record an audit log entry if audit logging is enabled.
pub fn audit_log(
    conn: &Connection,
    enabled: bool,
    headers: &HeaderMap,
    action: &str,
    resource_type: &str,
    resource_id: &str,
    details: Option<&serde_json::Value>,
) -> Result<()> {
    if !enabled {
        return Ok(());
    }
    let (ip, user_agent) = extract_request_info(headers);
    queries::create_audit_log(
        conn,
        action,
        resource_type,
        resource_id,
        details,
        ip.as_deref(),
        user_agent.as_deref(),
    )?;
    Ok(())
}
