//! Row mapping shared by the query functions.

use std::collections::BTreeMap;

use rusqlite::{Connection, Row, ToSql, types::Type};
use rust_decimal::Decimal;

use crate::currency::Currency;
use crate::error::Result;
use crate::models::{AuditLog, Order, OrderStatus};

pub const ORDER_COLS: &str = "id, total, currency, billing_email, status, created_at, updated_at";

pub const AUDIT_LOG_COLS: &str =
    "id, timestamp, action, resource_type, resource_id, details, ip_address, user_agent";

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let total: String = row.get(1)?;
        let currency: String = row.get(2)?;
        let status: String = row.get(4)?;
        Ok(Order {
            id: row.get(0)?,
            total: total
                .parse::<Decimal>()
                .map_err(|e| conversion_error(1, e.to_string()))?,
            currency: Currency::parse(&currency).map_err(|e| conversion_error(2, e.to_string()))?,
            billing_email: row.get(3)?,
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| conversion_error(4, e.to_string()))?,
            metadata: BTreeMap::new(),
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for AuditLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let details: Option<String> = row.get(5)?;
        Ok(AuditLog {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            action: row.get(2)?,
            resource_type: row.get(3)?,
            resource_id: row.get(4)?,
            details: details.and_then(|d| serde_json::from_str(&d).ok()),
            ip_address: row.get(6)?,
            user_agent: row.get(7)?,
        })
    }
}

pub fn query_one<T: FromRow>(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow>(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
