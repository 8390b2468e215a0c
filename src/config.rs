use std::env;
use std::time::Duration;

pub const DEFAULT_PROVIDER_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_WIDGET_SCRIPT_URL: &str = "https://checkout.stripe.com/checkout.js";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub dev_mode: bool,
    /// Base64-encoded 32-byte key protecting merchant secret keys at rest
    pub master_key: Option<String>,
    /// Bearer token required on /admin routes (admin routes disabled when unset)
    pub admin_api_key: Option<String>,
    pub provider_api_base: String,
    /// Upper bound on a single intent-creation call
    pub provider_timeout: Duration,
    /// Shown in the hosted widget header
    pub merchant_name: String,
    pub widget_script_url: String,
    /// Enable/disable audit logging entirely
    pub audit_log_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("PAYHAND_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let provider_timeout_secs: u64 = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(10);

        let audit_log_enabled = env::var("AUDIT_LOG_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "payhand.db".to_string()),
            base_url,
            dev_mode,
            master_key: env::var("PAYHAND_MASTER_KEY").ok().filter(|k| !k.is_empty()),
            admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty()),
            provider_api_base: env::var("PROVIDER_API_BASE")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_API_BASE.to_string()),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            merchant_name: env::var("MERCHANT_NAME").unwrap_or_else(|_| "Shop".to_string()),
            widget_script_url: env::var("WIDGET_SCRIPT_URL")
                .unwrap_or_else(|_| DEFAULT_WIDGET_SCRIPT_URL.to_string()),
            audit_log_enabled,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
