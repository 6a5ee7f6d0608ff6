use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use karat_core::transfer::{StatusUpdateRequest, TransferBundle, TransferRequest};

use crate::error::ApiResult;
use crate::response::Envelope;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transfer))
        .route("/{id}", get(get_transfer))
        .route("/{id}/status", patch(update_transfer_status))
}

pub async fn create_transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Envelope<TransferBundle>> {
    let Json(request) = payload?;
    let bundle = state.db.transfers().create(request).await?;
    Ok(Envelope::created("Stock transfer created", bundle))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<TransferBundle>> {
    let bundle = state.db.transfers().get_bundle(&id).await?;
    Ok(Envelope::ok("Stock transfer fetched", bundle))
}

pub async fn update_transfer_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Envelope<TransferBundle>> {
    let Json(request) = payload?;
    let bundle = state.db.transfers().update_status(&id, request).await?;
    Ok(Envelope::ok("Stock transfer status updated", bundle))
}
