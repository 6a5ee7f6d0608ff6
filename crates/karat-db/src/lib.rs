//! # karat-db: Persistence and Workflows for the Karat Engine
//!
//! This crate owns every SQL statement of the Karat transactional engine.
//! It uses SQLite with sqlx for async operations, and runs each multi-step
//! workflow (invoice create/update, transfer create, transfer status update)
//! inside a single transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Karat Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales-invoices)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     karat-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ InvoiceRepo    │   │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ TransferRepo   │   │   _schema    │  │   │
//! │  │   │ EngineSettings│    │ CatalogRepo …  │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                               │                                 │   │
//! │  │                               ▼                                 │   │
//! │  │                 karat-core (totals, pricing, state machine)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (invoice, transfer, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use karat_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/karat.db")).await?;
//!
//! let quote = db.catalog().quote(&product_id, &item_id).await?;
//! let bundle = db.invoices().create(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::adjustment::AdjustmentRepository;
pub use repository::branch::BranchRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::material::MaterialRepository;
pub use repository::series::SeriesRepository;
pub use repository::transfer::TransferRepository;
