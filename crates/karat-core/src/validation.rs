//! # Validation Module
//!
//! Shape checks applied to invoice and transfer requests before any row is
//! read or written.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum Json extractor)                                   │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Document numbers, quantities, amounts                             │
//! │  └── Runs before the transaction opens                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Workflow inside the transaction                              │
//! │  ├── References exist, stock suffices, credits unused                  │
//! │  └── SQLite UNIQUE / CHECK / FOREIGN KEY constraints                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use karat_core::validation::{validate_document_no, validate_quantity};
//!
//! validate_document_no("invoice_no", "INV/2024-25/0001").unwrap();
//! validate_quantity("quantity", 5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_AMOUNT_CENTS, MAX_DOCUMENT_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a business document number (`invoice_no`, `transfer_no`).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, `-`, `_` and `/` only (series codes look like
///   `INV/2024-25/0007`)
///
/// ## Example
/// ```rust
/// use karat_core::validation::validate_document_no;
///
/// assert!(validate_document_no("transfer_no", "ST/2024-25/0001").is_ok());
/// assert!(validate_document_no("transfer_no", "").is_err());
/// assert!(validate_document_no("transfer_no", "ST 1").is_err());
/// ```
pub fn validate_document_no(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, '-', '_' and '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates that a required identifier is present.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an optional free-text field's length.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<()> {
    match value {
        Some(text) if text.len() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount in paise (rates, discounts, credits).
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed [`MAX_AMOUNT_CENTS`]
///
/// ## Example
/// ```rust
/// use karat_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("rate", 0).is_ok());
/// assert!(validate_amount_cents("rate", -1).is_err());
/// assert!(validate_amount_cents("rate", i64::MAX).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    ensure_amount_in_range(field, cents)
}

/// Validates a payment amount in paise. Zero payments are rejected.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    ensure_amount_in_range("payment amount", cents)
}

fn ensure_amount_in_range(field: &str, cents: i64) -> ValidationResult<()> {
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on one document.
///
/// Emptiness is a business rule reported as `CoreError::EmptyItems`; this
/// only guards the upper bound.
pub fn validate_line_count(field: &str, lines: usize) -> ValidationResult<()> {
    if lines > MAX_DOCUMENT_LINES {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_DOCUMENT_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_document_no() {
        assert!(validate_document_no("invoice_no", "INV/2024-25/0001").is_ok());
        assert!(validate_document_no("invoice_no", "INV-42").is_ok());

        assert!(validate_document_no("invoice_no", "").is_err());
        assert!(validate_document_no("invoice_no", "   ").is_err());
        assert!(validate_document_no("invoice_no", "INV 42").is_err());
        assert!(validate_document_no("invoice_no", &"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", -1).is_err());
        assert!(validate_quantity("quantity", MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amount_cents("rate", 0).is_ok());
        assert!(validate_amount_cents("rate", 1099).is_ok());
        assert!(validate_amount_cents("rate", -100).is_err());
        assert!(validate_amount_cents("rate", MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_amount_cents("rate", MAX_AMOUNT_CENTS + 1).is_err());

        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("remarks", None, 10).is_ok());
        assert!(validate_optional_text("remarks", Some("short"), 10).is_ok());
        assert!(validate_optional_text("remarks", Some("far too long"), 10).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count("items", 1).is_ok());
        assert!(validate_line_count("items", MAX_DOCUMENT_LINES + 1).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(300).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
