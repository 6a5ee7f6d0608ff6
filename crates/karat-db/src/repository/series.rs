//! # Fiscal Series Repository
//!
//! Sequential, human-readable document numbers scoped to a prefix and an
//! Indian fiscal year (April to March).
//!
//! ```text
//!   next_code("INV", 2024-06-01)  →  INV/2024-25/0001
//!   next_code("INV", 2024-06-02)  →  INV/2024-25/0002
//!   next_code("ST",  2025-04-01)  →  ST/2025-26/0001
//! ```
//!
//! The counter is bumped with a single upsert, so two writers can never be
//! handed the same number.

use chrono::{Datelike, NaiveDate};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Prefix for sales invoice numbers.
pub const INVOICE_PREFIX: &str = "INV";

/// Prefix for stock transfer numbers.
pub const TRANSFER_PREFIX: &str = "ST";

/// Repository for fiscal series counters.
#[derive(Debug, Clone)]
pub struct SeriesRepository {
    pool: SqlitePool,
}

impl SeriesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SeriesRepository { pool }
    }

    /// Returns the next code for `prefix` in the fiscal year containing `date`.
    pub async fn next_code(&self, prefix: &str, date: NaiveDate) -> DbResult<String> {
        let mut conn = self.pool.acquire().await?;
        next_code(&mut conn, prefix, date).await
    }
}

/// Fiscal year label, e.g. `2024-25` for any date from 2024-04-01 to
/// 2025-03-31.
pub fn fiscal_year_label(date: NaiveDate) -> String {
    let start = if date.month() >= 4 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{}-{:02}", start, (start + 1) % 100)
}

pub(crate) async fn next_code(
    conn: &mut SqliteConnection,
    prefix: &str,
    date: NaiveDate,
) -> DbResult<String> {
    let fiscal_year = fiscal_year_label(date);

    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO document_series (prefix, fiscal_year, last_value)
        VALUES (?1, ?2, 1)
        ON CONFLICT (prefix, fiscal_year)
        DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(prefix)
    .bind(&fiscal_year)
    .fetch_one(&mut *conn)
    .await?;

    let code = format!("{prefix}/{fiscal_year}/{value:04}");
    debug!(code = %code, "Issued series code");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fiscal_year_label() {
        assert_eq!(fiscal_year_label(date(2024, 4, 1)), "2024-25");
        assert_eq!(fiscal_year_label(date(2025, 3, 31)), "2024-25");
        assert_eq!(fiscal_year_label(date(2099, 12, 1)), "2099-00");
    }

    #[tokio::test]
    async fn test_codes_are_sequential_per_prefix_and_year() {
        let db = test_support::db().await;
        let series = db.series();

        assert_eq!(
            series.next_code("INV", date(2024, 6, 1)).await.unwrap(),
            "INV/2024-25/0001"
        );
        assert_eq!(
            series.next_code("INV", date(2024, 6, 2)).await.unwrap(),
            "INV/2024-25/0002"
        );
        assert_eq!(
            series.next_code("ST", date(2024, 6, 2)).await.unwrap(),
            "ST/2024-25/0001"
        );
        assert_eq!(
            series.next_code("INV", date(2025, 4, 1)).await.unwrap(),
            "INV/2025-26/0001"
        );
    }
}
