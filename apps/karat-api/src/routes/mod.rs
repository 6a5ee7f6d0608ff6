//! Route table.
//!
//! ```text
//! POST   /api/sales-invoices                                 create invoice
//! GET    /api/sales-invoices/{id}                            invoice bundle
//! PUT    /api/sales-invoices/{id}                            update invoice
//! POST   /api/stock-transfers                                create transfer
//! GET    /api/stock-transfers/{id}                           transfer bundle
//! PATCH  /api/stock-transfers/{id}/status                    advance status
//! GET    /api/products/{product_id}/items/{item_id}/price    price quote
//! GET    /health                                             store liveness
//! ```

pub mod invoices;
pub mod pricing;
pub mod transfers;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::response::Envelope;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/sales-invoices", invoices::router())
        .nest("/api/stock-transfers", transfers::router())
        .nest("/api/products", pricing::router())
        .route("/health", get(health_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    database: &'static str,
    version: &'static str,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        Envelope::ok(
            "OK",
            Health {
                database: "up",
                version: env!("CARGO_PKG_VERSION"),
            },
        )
    } else {
        Envelope::error(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}
