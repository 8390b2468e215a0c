mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::crypto::MasterKey;
use crate::gateway::GatewayRegistry;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub audit_log_enabled: bool,
    pub master_key: MasterKey,
    /// Bearer token for /admin routes; None disables them
    pub admin_api_key: Option<String>,
    pub gateways: Arc<GatewayRegistry>,
}

/// Build a connection pool for a SQLite file with foreign keys enforced and
/// fully synchronous commits (a committed metadata write must survive a crash).
pub fn create_pool(path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA synchronous = FULL;")
    });
    Pool::builder().max_size(8).build(manager)
}
