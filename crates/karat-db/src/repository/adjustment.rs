//! # Adjustment Ledger
//!
//! Credit documents (sales returns, old-jewel exchanges) and the lock that
//! lets each one reduce exactly one finalized invoice.
//!
//! ## Credit Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SalesReturn / OldJewel   is_bill_adjusted = 0                         │
//! │       │                                                                 │
//! │       │  validate()  ── draft / hold / printed saves: must exist, unused│
//! │       │                                                                 │
//! │       ▼  lock()      ── only when the invoice reaches status Invoice   │
//! │  is_bill_adjusted = 1    (never released: the invoice is immutable)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  any later invoice referencing it → "Invalid or already used reference"│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use karat_core::{AdjustmentType, CoreError, Money, OldJewel, SalesReturn};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for credit documents and the adjustment lock.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    pool: SqlitePool,
}

impl AdjustmentRepository {
    /// Creates a new AdjustmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentRepository { pool }
    }

    /// Records a sales return whose value can be credited once.
    pub async fn insert_sales_return(&self, return_no: &str, amount: Money) -> DbResult<SalesReturn> {
        let row = SalesReturn {
            id: Uuid::new_v4().to_string(),
            return_no: return_no.to_string(),
            amount_cents: amount.cents(),
            is_bill_adjusted: false,
            created_at: Utc::now(),
        };

        debug!(id = %row.id, return_no = %row.return_no, "Inserting sales return");

        sqlx::query(
            r#"
            INSERT INTO sales_returns (id, return_no, amount_cents, is_bill_adjusted, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(&row.id)
        .bind(&row.return_no)
        .bind(row.amount_cents)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    /// Records an old-jewel exchange voucher.
    pub async fn insert_old_jewel(&self, voucher_no: &str, amount: Money) -> DbResult<OldJewel> {
        let row = OldJewel {
            id: Uuid::new_v4().to_string(),
            voucher_no: voucher_no.to_string(),
            amount_cents: amount.cents(),
            is_bill_adjusted: false,
            created_at: Utc::now(),
        };

        debug!(id = %row.id, voucher_no = %row.voucher_no, "Inserting old jewel voucher");

        sqlx::query(
            r#"
            INSERT INTO old_jewels (id, voucher_no, amount_cents, is_bill_adjusted, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(&row.id)
        .bind(&row.voucher_no)
        .bind(row.amount_cents)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lock state of a credit document, `None` when it does not exist.
    pub async fn is_locked(
        &self,
        adjustment_type: AdjustmentType,
        reference_id: &str,
    ) -> DbResult<Option<bool>> {
        let mut conn = self.pool.acquire().await?;
        lock_state(&mut conn, adjustment_type, reference_id).await
    }

    /// Fails unless the referenced document exists and is unused.
    pub async fn validate(
        &self,
        adjustment_type: AdjustmentType,
        reference_id: &str,
    ) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        validate(&mut conn, adjustment_type, reference_id).await
    }

    /// Consumes the referenced document.
    pub async fn lock(&self, adjustment_type: AdjustmentType, reference_id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        lock(&mut conn, adjustment_type, reference_id).await
    }
}

/// Table holding the credit documents of one adjustment type.
fn source_table(adjustment_type: AdjustmentType) -> &'static str {
    match adjustment_type {
        AdjustmentType::SalesReturn => "sales_returns",
        AdjustmentType::OldJewel => "old_jewels",
    }
}

fn unavailable(adjustment_type: AdjustmentType, reference_id: &str) -> DbError {
    CoreError::AdjustmentUnavailable {
        adjustment_type: adjustment_type.as_str().to_string(),
        reference_id: reference_id.to_string(),
    }
    .into()
}

pub(crate) async fn lock_state(
    conn: &mut SqliteConnection,
    adjustment_type: AdjustmentType,
    reference_id: &str,
) -> DbResult<Option<bool>> {
    let sql = format!(
        "SELECT is_bill_adjusted FROM {} WHERE id = ?1",
        source_table(adjustment_type)
    );
    let locked: Option<bool> = sqlx::query_scalar(&sql)
        .bind(reference_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(locked)
}

pub(crate) async fn validate(
    conn: &mut SqliteConnection,
    adjustment_type: AdjustmentType,
    reference_id: &str,
) -> DbResult<()> {
    match lock_state(conn, adjustment_type, reference_id).await? {
        Some(false) => Ok(()),
        _ => {
            warn!(
                adjustment_type = adjustment_type.as_str(),
                reference_id = %reference_id,
                "Rejected adjustment reference"
            );
            Err(unavailable(adjustment_type, reference_id))
        }
    }
}

/// Sets the lock only if it is still clear, so two invoices finalizing
/// against the same credit cannot both succeed.
pub(crate) async fn lock(
    conn: &mut SqliteConnection,
    adjustment_type: AdjustmentType,
    reference_id: &str,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET is_bill_adjusted = 1 WHERE id = ?1 AND is_bill_adjusted = 0",
        source_table(adjustment_type)
    );
    let result = sqlx::query(&sql)
        .bind(reference_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(unavailable(adjustment_type, reference_id));
    }

    debug!(
        adjustment_type = adjustment_type.as_str(),
        reference_id = %reference_id,
        "Locked credit document"
    );
    Ok(())
}
