//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults. Invalid values fail startup, silently wrong
//! configuration does not.

use serde::{Deserialize, Serialize};
use std::env;

/// Payment processor settings (checkout-session API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Base URL of the processor API.
    pub api_url: String,

    /// Secret API key (bearer auth).
    pub secret_key: String,

    /// Shared secret the processor sends back on webhook calls.
    pub webhook_secret: String,

    /// Where the processor redirects after a successful payment.
    pub success_url: String,

    /// Where the processor redirects after an abandoned payment.
    pub cancel_url: String,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port.
    pub http_port: u16,

    /// SQLite database file path.
    pub database_path: String,

    /// JWT secret key for signing admin tokens.
    pub jwt_secret: String,

    /// JWT token lifetime in seconds.
    pub jwt_lifetime_secs: i64,

    /// Argon2 hash of the admin password. When `None`, admin login is
    /// disabled entirely.
    pub admin_password_hash: Option<String>,

    /// Payment processor settings.
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./frantoio.db".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            // In production, this MUST be set via environment variable
            "frantoio-dev-secret-change-in-production".to_string()
        });

        let jwt_lifetime_secs = env::var("JWT_LIFETIME_SECS")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?;

        // Either a precomputed hash, or (development only) a plain
        // password hashed at startup. Neither set → login disabled.
        let admin_password_hash = match env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) => Some(hash),
            Err(_) => match env::var("ADMIN_PASSWORD") {
                Ok(plain) => Some(
                    crate::auth::hash_password(&plain)
                        .map_err(|_| ConfigError::InvalidValue("ADMIN_PASSWORD".to_string()))?,
                ),
                Err(_) => None,
            },
        };

        let payment = PaymentConfig {
            api_url: env::var("PAYMENT_API_URL")
                .unwrap_or_else(|_| "https://api.payments.example".to_string()),
            secret_key: env::var("PAYMENT_SECRET_KEY")
                .unwrap_or_else(|_| "sk_test_dev-change-in-production".to_string()),
            webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET")
                .unwrap_or_else(|_| "whsec_dev-change-in-production".to_string()),
            success_url: env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:3000/ordine/grazie".to_string()),
            cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:3000/carrello".to_string()),
        };

        Ok(AppConfig {
            http_port,
            database_path,
            jwt_secret,
            jwt_lifetime_secs,
            admin_password_hash,
            payment,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
