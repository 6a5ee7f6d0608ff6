//! # Stock Transfer Repository
//!
//! Moves stock between branches and drives the transfer status machine.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │  transfer_no, duplicate check, both branches active                    │
//! │  every (product, item) pair exists, belongs together and is held by    │
//! │  branch_from                                                           │
//! │  INSERT header (status 1 Pending)                                      │
//! │                                                                         │
//! │  for each source product group                                         │
//! │    for each line                                                       │
//! │      source.quantity −= n            (conditional, else abort)         │
//! │      stock_locations[(sku, branch_to)]                                 │
//! │        ├── Merge  → destination.quantity += n                          │
//! │        └── Clone  → destination product (once per group, with its      │
//! │                     details, variants, add-ons) + new item, qty = n,   │
//! │                     + location row                                      │
//! │      INSERT line with destination ids                                  │
//! │                                                                         │
//! │  INSERT history (1, "Created")                                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Update
//! ```text
//!   stock_transfer_tracking         one row per transfer, updated in place
//!   stock_transfer_status_history   one row per transition, never updated
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use karat_core::transfer::{
    history_note, DestinationResolution, StatusUpdateRequest, StockLocation, TrackingChange,
    TransferBundle, TransferRequest,
};
use karat_core::{
    CoreError, Product, ProductItemDetail, StockTransfer, StockTransferItem,
    StockTransferStatusHistory, StockTransferTracking, TransferStatus,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::series::{self, TRANSFER_PREFIX};
use crate::repository::{branch, catalog};

const TRANSFER_COLUMNS: &str = "id, transfer_no, transfer_date, branch_from, branch_to, \
     status_id, remarks, is_deleted, created_at, updated_at";

/// Repository for stock transfers.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a transfer and moves its stock.
    ///
    /// Any missing reference or short source item aborts the whole transfer.
    pub async fn create(&self, request: TransferRequest) -> DbResult<TransferBundle> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let transfer_no = match &request.transfer_no {
            Some(no) => no.clone(),
            None => series::next_code(&mut tx, TRANSFER_PREFIX, request.transfer_date).await?,
        };
        ensure_transfer_no_free(&mut tx, &transfer_no).await?;
        for branch_id in [&request.branch_from, &request.branch_to] {
            if !branch::exists_active(&mut tx, branch_id).await? {
                return Err(CoreError::not_found("Branch", branch_id.as_str()).into());
            }
        }

        let mut sources: Vec<(Product, ProductItemDetail)> = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let (product, source) = catalog::fetch_product_and_item(
                &mut tx,
                &item.product_id,
                &item.product_item_detail_id,
            )
            .await?;
            if product.branch_id != request.branch_from {
                return Err(CoreError::SourceBranchMismatch {
                    product_id: product.id,
                    held_by: product.branch_id,
                    branch_from: request.branch_from.clone(),
                }
                .into());
            }
            sources.push((product, source));
        }

        let now = Utc::now();
        let transfer = StockTransfer {
            id: Uuid::new_v4().to_string(),
            transfer_no,
            transfer_date: request.transfer_date,
            branch_from: request.branch_from.clone(),
            branch_to: request.branch_to.clone(),
            status_id: TransferStatus::Pending,
            remarks: request.remarks.clone(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        insert_header(&mut tx, &transfer).await?;

        let mut merged = 0usize;
        let mut cloned = 0usize;

        for (source_product_id, indexes) in request.product_groups() {
            // Destination product shared by every clone of this group
            let mut group_product: Option<String> = None;

            for index in indexes {
                let line = &request.items[index];
                let (product, source) = &sources[index];

                if let Err(err) =
                    catalog::decrement_stock(&mut tx, &source.id, line.transfer_quantity).await
                {
                    warn!(
                        transfer_no = %transfer.transfer_no,
                        item_id = %source.id,
                        error = %err,
                        "Transfer source short"
                    );
                    return Err(err);
                }

                let location = find_location(&mut tx, &source.sku, &transfer.branch_to).await?;
                let resolution = DestinationResolution::from_location(location.as_ref());

                let (dest_product_id, dest_item_id) = match &resolution {
                    DestinationResolution::Merge {
                        product_id,
                        product_item_detail_id,
                    } => {
                        if *product_item_detail_id == source.id {
                            return Err(CoreError::SourceBranchMismatch {
                                product_id: product.id.clone(),
                                held_by: transfer.branch_to.clone(),
                                branch_from: transfer.branch_from.clone(),
                            }
                            .into());
                        }
                        catalog::increment_stock(
                            &mut tx,
                            product_item_detail_id,
                            line.transfer_quantity,
                        )
                        .await?;
                        merged += 1;
                        (product_id.clone(), product_item_detail_id.clone())
                    }
                    DestinationResolution::Clone => {
                        let dest_product_id = match &group_product {
                            Some(id) => id.clone(),
                            None => {
                                let id =
                                    clone_product(&mut tx, product, &transfer.branch_to, now)
                                        .await?;
                                group_product = Some(id.clone());
                                id
                            }
                        };
                        let dest_item_id = clone_item(
                            &mut tx,
                            source,
                            &dest_product_id,
                            line.transfer_quantity,
                            now,
                        )
                        .await?;
                        insert_location(
                            &mut tx,
                            &source.sku,
                            &transfer.branch_to,
                            &dest_product_id,
                            &dest_item_id,
                            now,
                        )
                        .await?;
                        cloned += 1;
                        (dest_product_id, dest_item_id)
                    }
                };

                debug!(
                    transfer_no = %transfer.transfer_no,
                    source_product = %source_product_id,
                    sku = %source.sku,
                    resolution = resolution.as_str(),
                    destination_item = %dest_item_id,
                    "Resolved transfer line"
                );

                let row = StockTransferItem {
                    id: Uuid::new_v4().to_string(),
                    stock_transfer_id: transfer.id.clone(),
                    product_id: line.product_id.clone(),
                    product_item_detail_id: line.product_item_detail_id.clone(),
                    transfer_quantity: line.transfer_quantity,
                    destination_product_id: Some(dest_product_id),
                    destination_item_id: Some(dest_item_id),
                    resolution: Some(resolution.as_str().to_string()),
                    created_at: now,
                };
                insert_line(&mut tx, &row).await?;
            }
        }

        insert_history(&mut tx, &transfer.id, TransferStatus::Pending, now).await?;

        tx.commit().await?;

        info!(
            transfer_id = %transfer.id,
            transfer_no = %transfer.transfer_no,
            branch_from = %transfer.branch_from,
            branch_to = %transfer.branch_to,
            merged,
            cloned,
            "Stock transfer created"
        );

        self.get_bundle(&transfer.id).await
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves a transfer one step forward and records the transition.
    pub async fn update_status(
        &self,
        id: &str,
        request: StatusUpdateRequest,
    ) -> DbResult<TransferBundle> {
        let mut tx = self.pool.begin().await?;

        let transfer = fetch_transfer(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Stock transfer", id))?;
        let tracking = fetch_tracking(&mut tx, id).await?;

        let change = match request.plan(
            transfer.status_id,
            tracking.as_ref().map(|t| t.dispatch_date),
        ) {
            Ok(change) => change,
            Err(err) => {
                warn!(
                    transfer_no = %transfer.transfer_no,
                    current = transfer.status_id.as_str(),
                    requested = request.status_id,
                    error = %err,
                    "Rejected status update"
                );
                return Err(err.into());
            }
        };
        let next = change.status();
        let now = Utc::now();

        apply_tracking(&mut tx, id, &change, now).await?;

        // Guard against a concurrent update that already moved the status
        let result = sqlx::query(
            "UPDATE stock_transfers SET status_id = ?1, updated_at = ?2 \
             WHERE id = ?3 AND status_id = ?4",
        )
        .bind(next)
        .bind(now)
        .bind(id)
        .bind(transfer.status_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidStatusTransition {
                document: format!("stock transfer {}", transfer.transfer_no),
                from: transfer.status_id.as_str().to_string(),
                to: next.as_str().to_string(),
            }
            .into());
        }

        insert_history(&mut tx, id, next, now).await?;

        tx.commit().await?;

        info!(
            transfer_id = %id,
            transfer_no = %transfer.transfer_no,
            from = transfer.status_id.as_str(),
            to = next.as_str(),
            "Stock transfer status updated"
        );

        self.get_bundle(id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a transfer with its lines, tracking row and status timeline.
    pub async fn get_bundle(&self, id: &str) -> DbResult<TransferBundle> {
        let mut conn = self.pool.acquire().await?;

        let transfer = fetch_transfer(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Stock transfer", id))?;

        let items = sqlx::query_as::<_, StockTransferItem>(
            r#"
            SELECT id, stock_transfer_id, product_id, product_item_detail_id, transfer_quantity,
                   destination_product_id, destination_item_id, resolution, created_at
            FROM stock_transfer_items
            WHERE stock_transfer_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let tracking = fetch_tracking(&mut conn, id).await?;

        let timeline = sqlx::query_as::<_, StockTransferStatusHistory>(
            r#"
            SELECT id, stock_transfer_id, status_id, note, created_at
            FROM stock_transfer_status_history
            WHERE stock_transfer_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(TransferBundle {
            transfer,
            items,
            tracking,
            timeline,
        })
    }
}

// =============================================================================
// Transaction steps
// =============================================================================

async fn fetch_transfer(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<StockTransfer>> {
    let sql =
        format!("SELECT {TRANSFER_COLUMNS} FROM stock_transfers WHERE id = ?1 AND is_deleted = 0");
    let transfer = sqlx::query_as::<_, StockTransfer>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(transfer)
}

async fn fetch_tracking(
    conn: &mut SqliteConnection,
    transfer_id: &str,
) -> DbResult<Option<StockTransferTracking>> {
    let tracking = sqlx::query_as::<_, StockTransferTracking>(
        r#"
        SELECT id, stock_transfer_id, dispatch_date, dispatched_by, vehicle_no,
               dispatch_remarks, delivery_date, received_by, delivery_remarks,
               created_at, updated_at
        FROM stock_transfer_tracking
        WHERE stock_transfer_id = ?1
        "#,
    )
    .bind(transfer_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(tracking)
}

async fn ensure_transfer_no_free(conn: &mut SqliteConnection, transfer_no: &str) -> DbResult<()> {
    let taken: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM stock_transfers WHERE transfer_no = ?1 AND is_deleted = 0",
    )
    .bind(transfer_no)
    .fetch_optional(&mut *conn)
    .await?;

    if taken.is_some() {
        warn!(transfer_no = %transfer_no, "Duplicate transfer number");
        return Err(CoreError::duplicate("transfer_no", transfer_no).into());
    }
    Ok(())
}

/// Looks up the transfer-created item for `sku` at `branch_id`.
///
/// A location whose product has since been deleted is dropped, so the line
/// clones a fresh destination instead.
async fn find_location(
    conn: &mut SqliteConnection,
    sku: &str,
    branch_id: &str,
) -> DbResult<Option<StockLocation>> {
    let location = sqlx::query_as::<_, StockLocation>(
        r#"
        SELECT id, sku, branch_id, product_id, product_item_detail_id
        FROM stock_locations
        WHERE sku = ?1 AND branch_id = ?2
        "#,
    )
    .bind(sku)
    .bind(branch_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(location) = location else {
        return Ok(None);
    };
    if catalog::fetch_product(conn, &location.product_id).await?.is_some() {
        return Ok(Some(location));
    }

    debug!(sku = %sku, branch_id = %branch_id, "Dropping stale stock location");
    sqlx::query("DELETE FROM stock_locations WHERE id = ?1")
        .bind(&location.id)
        .execute(&mut *conn)
        .await?;
    Ok(None)
}

async fn insert_location(
    conn: &mut SqliteConnection,
    sku: &str,
    branch_id: &str,
    product_id: &str,
    item_id: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_locations (id, sku, branch_id, product_id, product_item_detail_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(sku)
    .bind(branch_id)
    .bind(product_id)
    .bind(item_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Copies a product's catalog attributes into `branch_id`. Returns the new id.
async fn clone_product(
    conn: &mut SqliteConnection,
    source: &Product,
    branch_id: &str,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let product = Product {
        id: Uuid::new_v4().to_string(),
        branch_id: branch_id.to_string(),
        is_deleted: false,
        created_at: now,
        updated_at: now,
        ..source.clone()
    };
    catalog::insert_product(conn, &product).await?;
    catalog::copy_product_satellites(conn, &source.id, &product.id).await?;
    Ok(product.id)
}

/// Copies an item's stock and pricing attributes under `product_id`.
async fn clone_item(
    conn: &mut SqliteConnection,
    source: &ProductItemDetail,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let item = ProductItemDetail {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        quantity,
        is_transfer_item: true,
        created_at: now,
        updated_at: now,
        ..source.clone()
    };
    catalog::insert_item(conn, &item).await?;
    catalog::copy_item_charges(conn, &source.id, &item.id).await?;
    Ok(item.id)
}

async fn insert_header(conn: &mut SqliteConnection, transfer: &StockTransfer) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transfers (
            id, transfer_no, transfer_date, branch_from, branch_to, status_id,
            remarks, is_deleted, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&transfer.id)
    .bind(&transfer.transfer_no)
    .bind(transfer.transfer_date)
    .bind(&transfer.branch_from)
    .bind(&transfer.branch_to)
    .bind(transfer.status_id)
    .bind(&transfer.remarks)
    .bind(transfer.is_deleted)
    .bind(transfer.created_at)
    .bind(transfer.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_line(conn: &mut SqliteConnection, row: &StockTransferItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transfer_items (
            id, stock_transfer_id, product_id, product_item_detail_id, transfer_quantity,
            destination_product_id, destination_item_id, resolution, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&row.id)
    .bind(&row.stock_transfer_id)
    .bind(&row.product_id)
    .bind(&row.product_item_detail_id)
    .bind(row.transfer_quantity)
    .bind(&row.destination_product_id)
    .bind(&row.destination_item_id)
    .bind(&row.resolution)
    .bind(row.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_history(
    conn: &mut SqliteConnection,
    transfer_id: &str,
    status: TransferStatus,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transfer_status_history (id, stock_transfer_id, status_id, note, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(transfer_id)
    .bind(status)
    .bind(history_note(status))
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Writes the tracking projection: dispatch creates the row, delivery
/// extends it.
async fn apply_tracking(
    conn: &mut SqliteConnection,
    transfer_id: &str,
    change: &TrackingChange,
    now: DateTime<Utc>,
) -> DbResult<()> {
    match change {
        TrackingChange::Dispatch {
            dispatch_date,
            dispatched_by,
            vehicle_no,
            remarks,
        } => {
            upsert_dispatch(
                conn,
                transfer_id,
                *dispatch_date,
                dispatched_by.as_deref(),
                vehicle_no.as_deref(),
                remarks.as_deref(),
                now,
            )
            .await
        }
        TrackingChange::Delivery {
            delivery_date,
            received_by,
            remarks,
        } => {
            let result = sqlx::query(
                r#"
                UPDATE stock_transfer_tracking
                SET delivery_date = ?1, received_by = ?2, delivery_remarks = ?3, updated_at = ?4
                WHERE stock_transfer_id = ?5
                "#,
            )
            .bind(delivery_date)
            .bind(received_by)
            .bind(remarks)
            .bind(now)
            .bind(transfer_id)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(CoreError::not_found("Stock transfer tracking", transfer_id).into());
            }
            Ok(())
        }
    }
}

async fn upsert_dispatch(
    conn: &mut SqliteConnection,
    transfer_id: &str,
    dispatch_date: NaiveDate,
    dispatched_by: Option<&str>,
    vehicle_no: Option<&str>,
    remarks: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transfer_tracking (
            id, stock_transfer_id, dispatch_date, dispatched_by, vehicle_no,
            dispatch_remarks, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        ON CONFLICT (stock_transfer_id) DO UPDATE SET
            dispatch_date = excluded.dispatch_date,
            dispatched_by = excluded.dispatched_by,
            vehicle_no = excluded.vehicle_no,
            dispatch_remarks = excluded.dispatch_remarks,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(transfer_id)
    .bind(dispatch_date)
    .bind(dispatched_by)
    .bind(vehicle_no)
    .bind(remarks)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
