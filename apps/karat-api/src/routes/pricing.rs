use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use karat_core::pricing::PriceQuote;

use crate::error::ApiResult;
use crate::response::Envelope;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{product_id}/items/{item_id}/price", get(quote_item))
}

/// Live price of one stock-bearing item at the current material rate.
pub async fn quote_item(
    State(state): State<AppState>,
    Path((product_id, item_id)): Path<(String, String)>,
) -> ApiResult<Envelope<PriceQuote>> {
    let quote = state.db.catalog().quote(&product_id, &item_id).await?;
    Ok(Envelope::ok("Price computed", quote))
}
