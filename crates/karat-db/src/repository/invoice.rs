//! # Invoice Repository
//!
//! Create and update of sales invoices as one atomic unit.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request.validate()          shape checks (no store access)            │
//! │  compute_totals()            discount, tax, adjustments, payments,     │
//! │                              cash limit (pure, karat-core)             │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  invoice_no                  given, or next INV fiscal code            │
//! │  duplicate check             among non-deleted invoices                │
//! │  branch, products, items     exist and belong together                 │
//! │  adjustments                 exist and are unused                      │
//! │  INSERT header, items, payments, adjustments                           │
//! │       │                                                                 │
//! │       ├── status == Invoice ──► lock credits, decrement stock          │
//! │       ▼                                                                 │
//! │  COMMIT  (any Err above drops the transaction: nothing persists)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Update runs the same pipeline against the stored row and reconciles the
//! child rows by id. An invoice in status `Invoice` is never touched again.

use chrono::{DateTime, Utc};
use karat_core::invoice::{
    compute_totals, ensure_updatable, plan_reconcile, AdjustmentInput, InvoiceBundle,
    InvoiceItemInput, InvoiceRequest, InvoiceTotals, PaymentInput, ReconcilePlan,
};
use karat_core::{
    CoreError, EngineSettings, InvoiceStatus, Payment, SalesInvoiceAdjustment, SalesInvoiceBill,
    SalesInvoiceBillItem,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::series::{self, INVOICE_PREFIX};
use crate::repository::{adjustment, branch, catalog};

const INVOICE_COLUMNS: &str = "id, invoice_no, invoice_date, branch_id, customer_id, status, \
     discount_type, discount_value, subtotal_cents, discount_cents, cgst_cents, sgst_cents, \
     tax_cents, adjustment_cents, total_cents, total_quantity, paid_cents, amount_due_cents, \
     refund_cents, remarks, is_deleted, created_at, updated_at, finalized_at";

/// Product data copied onto an invoice line at sale time.
#[derive(Debug)]
struct LineSnapshot {
    sku: String,
    name: String,
}

/// Repository for the invoice lifecycle.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    settings: EngineSettings,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool, settings: EngineSettings) -> Self {
        InvoiceRepository { pool, settings }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an invoice with its items, payments and adjustments.
    ///
    /// When the requested status is `Invoice` the referenced credits are
    /// locked and stock is taken off every stock-bearing line in the same
    /// transaction.
    pub async fn create(&self, request: InvoiceRequest) -> DbResult<InvoiceBundle> {
        request.validate()?;
        let totals = compute_totals(&request, &self.settings)?;
        let header = &request.header;

        let mut tx = self.pool.begin().await?;

        let invoice_no = match &header.invoice_no {
            Some(no) => no.clone(),
            None => series::next_code(&mut tx, INVOICE_PREFIX, header.invoice_date).await?,
        };
        ensure_invoice_no_free(&mut tx, &invoice_no, None).await?;
        ensure_branch(&mut tx, &header.branch_id).await?;

        let snapshots = resolve_items(&mut tx, &request.items).await?;
        validate_adjustments(&mut tx, &request.adjustments).await?;

        let now = Utc::now();
        let invoice = SalesInvoiceBill {
            id: Uuid::new_v4().to_string(),
            invoice_no,
            invoice_date: header.invoice_date,
            branch_id: header.branch_id.clone(),
            customer_id: header.customer_id.clone(),
            status: header.status,
            discount_type: header.discount_type,
            discount_value: header.discount_value,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            cgst_cents: totals.cgst.cents(),
            sgst_cents: totals.sgst.cents(),
            tax_cents: totals.tax().cents(),
            adjustment_cents: totals.adjustments.cents(),
            total_cents: totals.total.cents(),
            total_quantity: totals.total_quantity,
            paid_cents: totals.paid.cents(),
            amount_due_cents: totals.amount_due.cents(),
            refund_cents: totals.refund.cents(),
            remarks: header.remarks.clone(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
            finalized_at: header.status.is_final().then_some(now),
        };

        debug!(invoice_no = %invoice.invoice_no, status = invoice.status.as_str(), "Inserting invoice");
        insert_header(&mut tx, &invoice).await?;

        for (index, item) in request.items.iter().enumerate() {
            insert_line(&mut tx, &invoice.id, item, &snapshots[index], &totals, index, now).await?;
        }
        for payment in &request.payments {
            insert_payment(&mut tx, &invoice.id, payment, now).await?;
        }
        for adj in &request.adjustments {
            insert_adjustment(&mut tx, &invoice.id, adj, now).await?;
        }

        if invoice.status.is_final() {
            finalize(&mut tx, &invoice.invoice_no, &request).await?;
        }

        tx.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_no = %invoice.invoice_no,
            status = invoice.status.as_str(),
            total = %totals.total,
            "Invoice created"
        );

        self.get_bundle(&invoice.id).await
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replaces an invoice's header and reconciles its children by id.
    ///
    /// Rows in the payload with an id are updated in place, rows without one
    /// are inserted, and stored rows missing from the payload are removed.
    pub async fn update(&self, id: &str, request: InvoiceRequest) -> DbResult<InvoiceBundle> {
        request.validate()?;
        let totals = compute_totals(&request, &self.settings)?;
        let header = &request.header;

        let mut tx = self.pool.begin().await?;

        let existing = fetch_invoice(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sales invoice", id))?;
        if let Err(err) = ensure_updatable(&existing, header.status) {
            warn!(invoice_no = %existing.invoice_no, error = %err, "Rejected invoice update");
            return Err(err.into());
        }

        let invoice_no = header
            .invoice_no
            .clone()
            .unwrap_or_else(|| existing.invoice_no.clone());
        if invoice_no != existing.invoice_no {
            ensure_invoice_no_free(&mut tx, &invoice_no, Some(id)).await?;
        }
        ensure_branch(&mut tx, &header.branch_id).await?;

        let snapshots = resolve_items(&mut tx, &request.items).await?;
        validate_adjustments(&mut tx, &request.adjustments).await?;

        let now = Utc::now();
        let finalized_at = header.status.is_final().then_some(now);

        sqlx::query(
            r#"
            UPDATE sales_invoice_bills SET
                invoice_no = ?1, invoice_date = ?2, branch_id = ?3, customer_id = ?4,
                status = ?5, discount_type = ?6, discount_value = ?7, subtotal_cents = ?8,
                discount_cents = ?9, cgst_cents = ?10, sgst_cents = ?11, tax_cents = ?12,
                adjustment_cents = ?13, total_cents = ?14, total_quantity = ?15,
                paid_cents = ?16, amount_due_cents = ?17, refund_cents = ?18, remarks = ?19,
                updated_at = ?20, finalized_at = ?21
            WHERE id = ?22
            "#,
        )
        .bind(&invoice_no)
        .bind(header.invoice_date)
        .bind(&header.branch_id)
        .bind(&header.customer_id)
        .bind(header.status)
        .bind(header.discount_type)
        .bind(header.discount_value)
        .bind(totals.subtotal.cents())
        .bind(totals.discount.cents())
        .bind(totals.cgst.cents())
        .bind(totals.sgst.cents())
        .bind(totals.tax().cents())
        .bind(totals.adjustments.cents())
        .bind(totals.total.cents())
        .bind(totals.total_quantity)
        .bind(totals.paid.cents())
        .bind(totals.amount_due.cents())
        .bind(totals.refund.cents())
        .bind(&header.remarks)
        .bind(now)
        .bind(finalized_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // Items
        let stored = child_ids(&mut tx, "sales_invoice_bill_items", id).await?;
        let incoming: Vec<Option<String>> = request.items.iter().map(|i| i.id.clone()).collect();
        let plan = plan_reconcile("Invoice item", &stored, &incoming)?;
        remove_children(&mut tx, "sales_invoice_bill_items", id, &plan).await?;
        for (index, item_id) in &plan.update {
            let item = &request.items[*index];
            let snapshot = &snapshots[*index];
            sqlx::query(
                r#"
                UPDATE sales_invoice_bill_items SET
                    product_id = ?1, product_item_detail_id = ?2, sku_snapshot = ?3,
                    name_snapshot = ?4, quantity = ?5, rate_cents = ?6, discount_cents = ?7,
                    amount_cents = ?8
                WHERE id = ?9 AND invoice_id = ?10
                "#,
            )
            .bind(&item.product_id)
            .bind(&item.product_item_detail_id)
            .bind(&snapshot.sku)
            .bind(&snapshot.name)
            .bind(item.quantity)
            .bind(item.rate_cents)
            .bind(item.discount_cents)
            .bind(totals.line_amounts[*index].cents())
            .bind(item_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        for index in &plan.insert {
            let item = &request.items[*index];
            insert_line(&mut tx, id, item, &snapshots[*index], &totals, *index, now).await?;
        }

        // Payments
        let stored = child_ids(&mut tx, "payments", id).await?;
        let incoming: Vec<Option<String>> = request.payments.iter().map(|p| p.id.clone()).collect();
        let plan = plan_reconcile("Payment", &stored, &incoming)?;
        remove_children(&mut tx, "payments", id, &plan).await?;
        for (index, payment_id) in &plan.update {
            let payment = &request.payments[*index];
            sqlx::query(
                "UPDATE payments SET mode = ?1, amount_cents = ?2, reference = ?3 \
                 WHERE id = ?4 AND invoice_id = ?5",
            )
            .bind(payment.mode)
            .bind(payment.amount_cents)
            .bind(&payment.reference)
            .bind(payment_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        for index in &plan.insert {
            insert_payment(&mut tx, id, &request.payments[*index], now).await?;
        }

        // Adjustments
        let stored = child_ids(&mut tx, "sales_invoice_adjustments", id).await?;
        let incoming: Vec<Option<String>> =
            request.adjustments.iter().map(|a| a.id.clone()).collect();
        let plan = plan_reconcile("Invoice adjustment", &stored, &incoming)?;
        remove_children(&mut tx, "sales_invoice_adjustments", id, &plan).await?;
        for (index, adjustment_id) in &plan.update {
            let adj = &request.adjustments[*index];
            sqlx::query(
                "UPDATE sales_invoice_adjustments SET adjustment_type = ?1, reference_id = ?2, \
                 amount_cents = ?3 WHERE id = ?4 AND invoice_id = ?5",
            )
            .bind(adj.adjustment_type)
            .bind(&adj.reference_id)
            .bind(adj.amount_cents)
            .bind(adjustment_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        for index in &plan.insert {
            insert_adjustment(&mut tx, id, &request.adjustments[*index], now).await?;
        }

        if header.status.is_final() {
            finalize(&mut tx, &invoice_no, &request).await?;
        }

        tx.commit().await?;

        info!(
            invoice_id = %id,
            invoice_no = %invoice_no,
            from = existing.status.as_str(),
            to = header.status.as_str(),
            total = %totals.total,
            "Invoice updated"
        );

        self.get_bundle(id).await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an invoice with its items, payments and adjustments.
    pub async fn get_bundle(&self, id: &str) -> DbResult<InvoiceBundle> {
        let mut conn = self.pool.acquire().await?;

        let invoice = fetch_invoice(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sales invoice", id))?;

        let items = sqlx::query_as::<_, SalesInvoiceBillItem>(
            r#"
            SELECT id, invoice_id, product_id, product_item_detail_id, sku_snapshot,
                   name_snapshot, quantity, rate_cents, discount_cents, amount_cents, created_at
            FROM sales_invoice_bill_items
            WHERE invoice_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, invoice_id, mode, amount_cents, reference, created_at
            FROM payments
            WHERE invoice_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let adjustments = sqlx::query_as::<_, SalesInvoiceAdjustment>(
            r#"
            SELECT id, invoice_id, adjustment_type, reference_id, amount_cents, created_at
            FROM sales_invoice_adjustments
            WHERE invoice_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(InvoiceBundle {
            invoice,
            items,
            payments,
            adjustments,
        })
    }

    /// Soft-deletes an invoice that has not been finalized.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch_invoice(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sales invoice", id))?;
        if existing.status.is_final() {
            return Err(CoreError::InvoiceFinalized {
                invoice_no: existing.invoice_no,
            }
            .into());
        }

        sqlx::query("UPDATE sales_invoice_bills SET is_deleted = 1, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(invoice_id = %id, invoice_no = %existing.invoice_no, "Invoice deleted");
        Ok(())
    }
}

// =============================================================================
// Transaction steps
// =============================================================================

async fn fetch_invoice(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<SalesInvoiceBill>> {
    let sql = format!(
        "SELECT {INVOICE_COLUMNS} FROM sales_invoice_bills WHERE id = ?1 AND is_deleted = 0"
    );
    let invoice = sqlx::query_as::<_, SalesInvoiceBill>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(invoice)
}

/// Fails if a live invoice other than `exclude_id` already uses `invoice_no`.
async fn ensure_invoice_no_free(
    conn: &mut SqliteConnection,
    invoice_no: &str,
    exclude_id: Option<&str>,
) -> DbResult<()> {
    let taken: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM sales_invoice_bills WHERE invoice_no = ?1 AND is_deleted = 0 AND id <> ?2",
    )
    .bind(invoice_no)
    .bind(exclude_id.unwrap_or(""))
    .fetch_optional(&mut *conn)
    .await?;

    if taken.is_some() {
        warn!(invoice_no = %invoice_no, "Duplicate invoice number");
        return Err(CoreError::duplicate("invoice_no", invoice_no).into());
    }
    Ok(())
}

async fn ensure_branch(conn: &mut SqliteConnection, branch_id: &str) -> DbResult<()> {
    if !branch::exists_active(conn, branch_id).await? {
        return Err(CoreError::not_found("Branch", branch_id).into());
    }
    Ok(())
}

/// Checks every line reference and captures the snapshot stored on the line.
async fn resolve_items(
    conn: &mut SqliteConnection,
    items: &[InvoiceItemInput],
) -> DbResult<Vec<LineSnapshot>> {
    let mut snapshots = Vec::with_capacity(items.len());
    for item in items {
        let snapshot = match item.product_item_detail_id.as_deref() {
            Some(item_id) => {
                let (product, detail) =
                    catalog::fetch_product_and_item(conn, &item.product_id, item_id).await?;
                LineSnapshot {
                    sku: detail.sku,
                    name: product.name,
                }
            }
            None => {
                let product = catalog::fetch_product(conn, &item.product_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Product", &item.product_id))?;
                LineSnapshot {
                    sku: product.sku,
                    name: product.name,
                }
            }
        };
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

async fn validate_adjustments(
    conn: &mut SqliteConnection,
    adjustments: &[AdjustmentInput],
) -> DbResult<()> {
    for adj in adjustments {
        adjustment::validate(conn, adj.adjustment_type, &adj.reference_id).await?;
    }
    Ok(())
}

/// Locks credits and takes stock off. Runs only for status `Invoice`.
async fn finalize(
    conn: &mut SqliteConnection,
    invoice_no: &str,
    request: &InvoiceRequest,
) -> DbResult<()> {
    debug_assert_eq!(request.header.status, InvoiceStatus::Invoice);

    for adj in &request.adjustments {
        adjustment::lock(conn, adj.adjustment_type, &adj.reference_id).await?;
    }

    for item in &request.items {
        let Some(detail_id) = item.product_item_detail_id.as_deref() else {
            continue;
        };
        if let Err(err) = catalog::decrement_stock(conn, detail_id, item.quantity).await {
            warn!(invoice_no = %invoice_no, item_id = %detail_id, error = %err, "Stock deduction failed");
            return Err(err);
        }
    }

    debug!(
        invoice_no = %invoice_no,
        adjustments = request.adjustments.len(),
        "Invoice finalized"
    );
    Ok(())
}

async fn insert_header(conn: &mut SqliteConnection, invoice: &SalesInvoiceBill) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_invoice_bills (
            id, invoice_no, invoice_date, branch_id, customer_id, status,
            discount_type, discount_value, subtotal_cents, discount_cents, cgst_cents,
            sgst_cents, tax_cents, adjustment_cents, total_cents, total_quantity,
            paid_cents, amount_due_cents, refund_cents, remarks, is_deleted,
            created_at, updated_at, finalized_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
        )
        "#,
    )
    .bind(&invoice.id)
    .bind(&invoice.invoice_no)
    .bind(invoice.invoice_date)
    .bind(&invoice.branch_id)
    .bind(&invoice.customer_id)
    .bind(invoice.status)
    .bind(invoice.discount_type)
    .bind(invoice.discount_value)
    .bind(invoice.subtotal_cents)
    .bind(invoice.discount_cents)
    .bind(invoice.cgst_cents)
    .bind(invoice.sgst_cents)
    .bind(invoice.tax_cents)
    .bind(invoice.adjustment_cents)
    .bind(invoice.total_cents)
    .bind(invoice.total_quantity)
    .bind(invoice.paid_cents)
    .bind(invoice.amount_due_cents)
    .bind(invoice.refund_cents)
    .bind(&invoice.remarks)
    .bind(invoice.is_deleted)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .bind(invoice.finalized_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_line(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    item: &InvoiceItemInput,
    snapshot: &LineSnapshot,
    totals: &InvoiceTotals,
    index: usize,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_invoice_bill_items (
            id, invoice_id, product_id, product_item_detail_id, sku_snapshot, name_snapshot,
            quantity, rate_cents, discount_cents, amount_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(invoice_id)
    .bind(&item.product_id)
    .bind(&item.product_item_detail_id)
    .bind(&snapshot.sku)
    .bind(&snapshot.name)
    .bind(item.quantity)
    .bind(item.rate_cents)
    .bind(item.discount_cents)
    .bind(totals.line_amounts[index].cents())
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_payment(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    payment: &PaymentInput,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, invoice_id, mode, amount_cents, reference, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(invoice_id)
    .bind(payment.mode)
    .bind(payment.amount_cents)
    .bind(&payment.reference)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_adjustment(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    adj: &AdjustmentInput,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_invoice_adjustments (
            id, invoice_id, adjustment_type, reference_id, amount_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(invoice_id)
    .bind(adj.adjustment_type)
    .bind(&adj.reference_id)
    .bind(adj.amount_cents)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Ids of the child rows of one invoice in `table`.
async fn child_ids(
    conn: &mut SqliteConnection,
    table: &'static str,
    invoice_id: &str,
) -> DbResult<Vec<String>> {
    let sql = format!("SELECT id FROM {table} WHERE invoice_id = ?1 ORDER BY rowid");
    let ids: Vec<String> = sqlx::query_scalar(&sql)
        .bind(invoice_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

async fn remove_children(
    conn: &mut SqliteConnection,
    table: &'static str,
    invoice_id: &str,
    plan: &ReconcilePlan,
) -> DbResult<()> {
    let sql = format!("DELETE FROM {table} WHERE id = ?1 AND invoice_id = ?2");
    for id in &plan.remove {
        sqlx::query(&sql)
            .bind(id)
            .bind(invoice_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
