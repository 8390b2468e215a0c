//! Order storage as seen by the checkout core.
//!
//! The shop platform owns orders. The core only reads them, appends the
//! intent id to their metadata, and hands the returned token to the
//! platform's completion flow, all through [`OrderRepository`].

use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::models::Order;

pub trait OrderRepository: Send + Sync {
    fn get_order(&self, order_id: &str) -> Result<Option<Order>>;

    /// Durably record one metadata key. Must not return until the write is
    /// committed.
    fn set_meta(&self, order_id: &str, key: &str, value: &str) -> Result<()>;

    /// Platform completion flow: accept the widget's token for a pending
    /// order. Returns false if the order is no longer pending.
    fn complete_payment(&self, order_id: &str, payment_token: &str) -> Result<bool>;
}

/// Orders kept in the service's own SQLite database, standing in for the
/// shop platform's order store.
#[derive(Clone)]
pub struct SqliteOrderRepository {
    pool: DbPool,
}

impl SqliteOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for SqliteOrderRepository {
    fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        let conn = self.pool.get()?;
        queries::get_order(&conn, order_id)
    }

    fn set_meta(&self, order_id: &str, key: &str, value: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| AppError::Persistence(format!("no database connection: {}", e)))?;
        match queries::set_order_meta(&conn, order_id, key, value) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::Persistence(format!(
                "order {} disappeared before metadata write",
                order_id
            ))),
            Err(e) => Err(AppError::Persistence(e.to_string())),
        }
    }

    fn complete_payment(&self, order_id: &str, payment_token: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        queries::complete_order_payment(&conn, order_id, payment_token)
    }
}
