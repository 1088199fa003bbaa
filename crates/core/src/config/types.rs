use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub payments: PaymentsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// API key (required when method = "api_key")
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cratedig.db")
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// URL of the signing service that issues time-bounded write URLs
    pub signer_url: String,
    /// Bucket for publicly readable assets (cover images, preview samples)
    pub public_bucket: String,
    /// Bucket for deliverable archives (readable only via purchase flow)
    pub private_bucket: String,
    /// CDN base under which public storage keys resolve to URLs
    pub public_base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Payment processor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentsConfig {
    /// Processor API base URL
    #[serde(default = "default_payments_api_base")]
    pub api_base: String,
    /// Platform secret key
    pub secret_key: String,
    /// Platform cut on each payment link, in percent (default: 10)
    #[serde(default = "default_application_fee_percent")]
    pub application_fee_percent: f64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_payments_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_application_fee_percent() -> f64 {
    10.0
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub payments: SanitizedPaymentsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Sanitized payments config (secret key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPaymentsConfig {
    pub api_base: String,
    pub secret_key_configured: bool,
    pub application_fee_percent: f64,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            payments: SanitizedPaymentsConfig {
                api_base: config.payments.api_base.clone(),
                secret_key_configured: !config.payments.secret_key.is_empty(),
                application_fee_percent: config.payments.application_fee_percent,
                timeout_secs: config.payments.timeout_secs,
            },
        }
    }
}
