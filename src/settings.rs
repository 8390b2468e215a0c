//! Merchant settings as read by the gateway.

use crate::crypto::MasterKey;
use crate::db::{DbPool, queries};
use crate::error::Result;
use crate::models::MerchantConfig;

/// Read-only view of the merchant's gateway settings.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<MerchantConfig>;
}

#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: DbPool,
    master_key: MasterKey,
}

impl SqliteSettingsStore {
    pub fn new(pool: DbPool, master_key: MasterKey) -> Self {
        Self { pool, master_key }
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<MerchantConfig> {
        let conn = self.pool.get()?;
        queries::get_merchant_config(&conn, &self.master_key)
    }
}
