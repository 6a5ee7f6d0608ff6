//! Error types for the HTTP surface.
//!
//! Every failure leaves the server as the same envelope a success uses,
//! with `data: null`:
//!
//! ```text
//! ErrorKind::Validation  → 400
//! ErrorKind::Conflict    → 400
//! ErrorKind::NotFound    → 404
//! ErrorKind::Internal    → 500  (message replaced, details logged)
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use karat_core::{CoreError, ErrorKind};
use karat_db::DbError;
use tracing::error;

use crate::response::Envelope;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Failure raised by a workflow or the store.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Body could not be decoded into the expected request type.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Db(err) => err.kind(),
            ApiError::InvalidBody(_) => ErrorKind::Validation,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Db(DbError::Domain(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        Envelope::<()>::error(status, message).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err: ApiError = CoreError::not_found("Sales invoice", "x").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = CoreError::InvoiceFinalized {
            invoice_no: "INV/2024-25/0001".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::InvalidBody("missing field `items`".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
