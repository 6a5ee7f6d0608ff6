//! # karat-core: Pure Business Logic for the Karat ERP engine
//!
//! This crate holds every rule of the transactional consistency engine as
//! pure functions with zero I/O dependencies. Persistence and transaction
//! boundaries live in `karat-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Karat Engine Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    karat-api (axum)                             │   │
//! │  │    POST /sales-invoices ──► PATCH /stock-transfers/{id}/status  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               karat-db (transactions + SQL)                     │   │
//! │  │    InvoiceRepository, TransferRepository, AdjustmentRepository  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls pure rules                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ karat-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │ pricing  │  │ invoice  │  │ transfer │  │  money   │       │   │
//! │  │   │ quotes   │  │ totals   │  │ status   │  │  weight  │       │   │
//! │  │   │ per item │  │ payments │  │ merge or │  │  tax     │       │   │
//! │  │   │          │  │ credits  │  │ clone    │  │          │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain rows and enums (Product, SalesInvoiceBill, StockTransfer, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`weight`] - Weight type in milligrams
//! - [`pricing`] - Sale price and tax-inclusive final price for one stock unit
//! - [`invoice`] - Invoice request types and the totals pipeline
//! - [`transfer`] - Transfer request types, status machine, destination resolution
//! - [`settings`] - Injected engine settings (tax rate, cash limit)
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use karat_core::money::Money;
//! use karat_core::types::TaxRate;
//!
//! // Money is always integer paise
//! let price = Money::from_cents(100_000); // ₹1000.00
//!
//! // 3% tax
//! let tax = price.calculate_tax(TaxRate::from_bps(300));
//! assert_eq!(tax.cents(), 3_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod pricing;
pub mod settings;
pub mod transfer;
pub mod types;
pub mod validation;
pub mod weight;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use settings::EngineSettings;
pub use types::*;
pub use weight::Weight;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items accepted on one invoice or transfer.
pub const MAX_DOCUMENT_LINES: usize = 500;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Guards against typos (1000 instead of 10) on stock-mutating documents.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Largest single amount accepted on a request, in paise (₹1,000 crore).
///
/// Line amounts are held to the same bound, so a document of
/// [`MAX_DOCUMENT_LINES`] lines sums well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;
