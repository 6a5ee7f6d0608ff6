//! # Error Types
//!
//! Domain-specific error types for karat-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  karat-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Taxonomy: Validation / NotFound / Conflict /   │
//! │                         Internal                                        │
//! │                                                                         │
//! │  karat-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  karat-api errors (in app)                                             │
//! │  └── ApiError         - HTTP status + response envelope                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure inside a workflow is terminal: the surrounding transaction
//! rolls back and the caller sees exactly one of these.

use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification used by the outer layers to pick a status code.
///
/// ```text
/// Validation → 400    NotFound → 404    Conflict → 400    Internal → 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing required field, empty item list, malformed reference.
    Validation,
    /// Invoice, transfer or referenced document absent.
    NotFound,
    /// Duplicate number, insufficient stock, rule breach, bad transition.
    Conflict,
    /// Unexpected store failure.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document must carry at least one line.
    #[error("{document} must contain at least one item")]
    EmptyItems { document: String },

    /// Invoice or transfer number already used by a live document.
    #[error("{field} '{value}' already exists")]
    DuplicateDocument { field: String, value: String },

    /// An entity referenced by id does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A (product, item detail) pair does not belong together.
    #[error("Item detail {item_id} does not belong to product {product_id}")]
    InvalidReference { product_id: String, item_id: String },

    /// Not enough stock on a stock-bearing item.
    ///
    /// ## When This Occurs
    /// - Finalizing an invoice for more pieces than the lot holds
    /// - Transferring more than the source item holds
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Adjustment reference missing or already consumed by another invoice.
    #[error("Invalid or already used reference: {adjustment_type} #{reference_id}")]
    AdjustmentUnavailable {
        adjustment_type: String,
        reference_id: String,
    },

    /// The same credit document is referenced twice in one request.
    #[error("Adjustment reference {reference_id} is listed more than once")]
    DuplicateAdjustment { reference_id: String },

    /// Credits applied exceed the invoice total.
    #[error("Adjustments ({adjustments}) exceed invoice total ({total})")]
    AdjustmentExceedsTotal { adjustments: String, total: String },

    /// Cash received at or above the statutory threshold without a PAN.
    #[error("Cash payments of {cash} reach the limit of {limit}; PAN reference is mandatory")]
    CashLimitExceeded { cash: String, limit: String },

    /// Finalized invoices are immutable.
    #[error("Invoice {invoice_no} is finalized and cannot be modified")]
    InvoiceFinalized { invoice_no: String },

    /// A status change not allowed by the state machine.
    #[error("Cannot move {document} from {from} to {to}")]
    InvalidStatusTransition {
        document: String,
        from: String,
        to: String,
    },

    /// A transfer status that needs a date was requested without one.
    #[error("{field} is required for status {status}")]
    MissingStatusDate { field: String, status: String },

    /// Transfers must move stock between two different branches.
    #[error("Source and destination branch must differ (branch {branch_id})")]
    SameBranch { branch_id: String },

    /// A transfer line names a product held by another branch.
    #[error("Product {product_id} is held by branch {held_by}, not transfer source {branch_from}")]
    SourceBranchMismatch {
        product_id: String,
        held_by: String,
        branch_from: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a DuplicateDocument error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::DuplicateDocument {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps the error onto the four-way taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::EmptyItems { .. }
            | CoreError::InvalidReference { .. }
            | CoreError::MissingStatusDate { .. }
            | CoreError::SameBranch { .. }
            | CoreError::SourceBranchMismatch { .. }
            | CoreError::DuplicateAdjustment { .. }
            | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::DuplicateDocument { .. }
            | CoreError::InsufficientStock { .. }
            | CoreError::AdjustmentUnavailable { .. }
            | CoreError::AdjustmentExceedsTotal { .. }
            | CoreError::CashLimitExceeded { .. }
            | CoreError::InvoiceFinalized { .. }
            | CoreError::InvalidStatusTransition { .. } => ErrorKind::Conflict,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet basic shape requirements and are
/// raised before any row is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "GR-22K-001".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for GR-22K-001: available 3, requested 5"
        );
    }

    #[test]
    fn test_adjustment_message_mentions_reference() {
        let err = CoreError::AdjustmentUnavailable {
            adjustment_type: "sales_return".to_string(),
            reference_id: "abc".to_string(),
        };
        assert!(err.to_string().starts_with("Invalid or already used reference"));
    }

    #[test]
    fn test_kind_taxonomy() {
        assert_eq!(
            CoreError::EmptyItems {
                document: "Invoice".into()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(CoreError::not_found("Invoice", "1").kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::duplicate("invoice_no", "INV-1").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::CashLimitExceeded {
                cash: "1".into(),
                limit: "1".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "invoice_no".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
