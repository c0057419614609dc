//! # Frantoio Server
//!
//! Axum REST API for the storefront and the admin back-office.
//!
//! Exposed as a library so router-level tests (and the thin `main`)
//! can build the application without binding a socket.

pub mod auth;
pub mod config;
pub mod error;
pub mod payments;
pub mod routes;

use std::sync::Arc;

use frantoio_db::Database;
use frantoio_notify::NotifyConfig;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::payments::PaymentClient;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub payments: PaymentClient,
    pub notify: NotifyConfig,
    pub jwt: JwtManager,
}

/// The state handle every handler receives.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Assembles the shared state from loaded configuration.
    pub fn new(db: Database, config: AppConfig, notify: NotifyConfig) -> SharedState {
        let payments = PaymentClient::new(config.payment.clone());
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

        Arc::new(AppState {
            db,
            config,
            payments,
            notify,
            jwt,
        })
    }
}
