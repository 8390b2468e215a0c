mod audit_log;
mod intent;
mod merchant_config;
mod order;

pub use audit_log::*;
pub use intent::*;
pub use merchant_config::*;
pub use order::*;
