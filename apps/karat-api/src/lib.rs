//! # karat-api: HTTP Surface
//!
//! Exposes the invoice, transfer and pricing workflows of `karat-db` over
//! JSON. Handlers hold no business logic: decode, call one repository
//! method, wrap the result.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  client ──► axum Router ──► handler ──► db.invoices().create(..)       │
//! │                                 │                 │                     │
//! │                                 │                 ▼                     │
//! │                                 │        Ok(bundle) / Err(DbError)     │
//! │                                 ▼                                       │
//! │                Envelope { statusCode, message, data }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use karat_db::Database;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::router;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
