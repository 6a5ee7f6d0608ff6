use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use karat_core::invoice::{InvoiceBundle, InvoiceRequest};

use crate::error::ApiResult;
use crate::response::Envelope;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_invoice))
        .route("/{id}", get(get_invoice).put(update_invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> ApiResult<Envelope<InvoiceBundle>> {
    let Json(request) = payload?;
    let bundle = state.db.invoices().create(request).await?;
    Ok(Envelope::created("Sales invoice created", bundle))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<InvoiceBundle>> {
    let bundle = state.db.invoices().get_bundle(&id).await?;
    Ok(Envelope::ok("Sales invoice fetched", bundle))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> ApiResult<Envelope<InvoiceBundle>> {
    let Json(request) = payload?;
    let bundle = state.db.invoices().update(&id, request).await?;
    Ok(Envelope::ok("Sales invoice updated", bundle))
}
