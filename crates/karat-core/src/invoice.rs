//! # Invoice Module
//!
//! Request types for sales invoices and the pure totals pipeline that every
//! create and update runs before a single row is written.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items ──► amount = qty × rate − discount ──► subtotal, total qty      │
//! │                                                  │                      │
//! │  header discount (% of subtotal | flat), capped at subtotal            │
//! │                                                  │                      │
//! │  taxable = subtotal − discount                   ▼                      │
//! │  total   = taxable + CGST + SGST                                        │
//! │                                                  │                      │
//! │  adjustments: Σ ≤ total, else reject             ▼                      │
//! │  total = max(0, total − Σ) then round to whole units if any present    │
//! │                                                  │                      │
//! │  payments: paid > total → refund, else due       ▼                      │
//! │  Σ cash ≥ limit → reject (PAN required)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::settings::EngineSettings;
use crate::MAX_AMOUNT_CENTS;
use crate::types::{
    AdjustmentType, DiscountType, InvoiceStatus, Payment, PaymentMode, SalesInvoiceAdjustment,
    SalesInvoiceBill, SalesInvoiceBillItem,
};
use crate::validation::{
    validate_amount_cents, validate_document_no, validate_line_count, validate_optional_text,
    validate_payment_amount, validate_quantity, validate_required,
};

// =============================================================================
// Request Types
// =============================================================================

/// Invoice header as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceHeaderInput {
    /// Generated from the `INV` fiscal series when omitted on create.
    #[serde(default)]
    pub invoice_no: Option<String>,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub branch_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    /// bps for `Percentage`, paise for `Amount`.
    #[serde(default)]
    pub discount_value: i64,
    #[serde(default)]
    pub cgst_cents: i64,
    #[serde(default)]
    pub sgst_cents: i64,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// One invoice line. `id` is set when updating an existing line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceItemInput {
    #[serde(default)]
    pub id: Option<String>,
    pub product_id: String,
    /// Stock-bearing lot; stock is deducted from it on finalization.
    #[serde(default)]
    pub product_item_detail_id: Option<String>,
    pub quantity: i64,
    pub rate_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
}

impl InvoiceItemInput {
    /// `quantity × rate − discount`.
    pub fn amount(&self) -> CoreResult<Money> {
        Money::from_cents(self.rate_cents)
            .checked_multiply_quantity(self.quantity)
            .and_then(|gross| gross.checked_sub(Money::from_cents(self.discount_cents)))
            .ok_or_else(|| out_of_range("line amount"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    #[serde(default)]
    pub id: Option<String>,
    pub mode: PaymentMode,
    pub amount_cents: i64,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdjustmentInput {
    #[serde(default)]
    pub id: Option<String>,
    #[ts(type = "number")]
    pub adjustment_type: AdjustmentType,
    pub reference_id: String,
    pub amount_cents: i64,
}

/// Full create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceRequest {
    pub header: InvoiceHeaderInput,
    pub items: Vec<InvoiceItemInput>,
    #[serde(default, alias = "payment")]
    pub payments: Vec<PaymentInput>,
    #[serde(default, alias = "adjustment")]
    pub adjustments: Vec<AdjustmentInput>,
}

impl InvoiceRequest {
    /// Shape checks that need no store access.
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyItems {
                document: "Sales invoice".to_string(),
            });
        }
        validate_line_count("items", self.items.len())?;

        let header = &self.header;
        if let Some(no) = &header.invoice_no {
            validate_document_no("invoice_no", no)?;
        }
        validate_required("branch_id", &header.branch_id)?;
        validate_amount_cents("discount_value", header.discount_value)?;
        validate_amount_cents("cgst_amount", header.cgst_cents)?;
        validate_amount_cents("sgst_amount", header.sgst_cents)?;
        validate_optional_text("remarks", header.remarks.as_deref(), 500)?;

        for item in &self.items {
            validate_required("product_id", &item.product_id)?;
            validate_quantity("quantity", item.quantity)?;
            validate_amount_cents("rate", item.rate_cents)?;
            validate_amount_cents("discount_amount", item.discount_cents)?;
            let amount = item.amount()?;
            if amount.is_negative() {
                return Err(ValidationError::OutOfRange {
                    field: "discount_amount".to_string(),
                    min: 0,
                    max: item.rate_cents.saturating_mul(item.quantity),
                }
                .into());
            }
            validate_amount_cents("line amount", amount.cents())?;
        }

        validate_line_count("payments", self.payments.len())?;
        for payment in &self.payments {
            validate_payment_amount(payment.amount_cents)?;
        }

        validate_line_count("adjustments", self.adjustments.len())?;
        let mut seen = HashSet::new();
        for adjustment in &self.adjustments {
            validate_required("reference_id", &adjustment.reference_id)?;
            validate_amount_cents("adjustment amount", adjustment.amount_cents)?;
            if !seen.insert((adjustment.adjustment_type, adjustment.reference_id.as_str())) {
                return Err(CoreError::DuplicateAdjustment {
                    reference_id: adjustment.reference_id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// An invoice with its children, as returned by create, update and get.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceBundle {
    pub invoice: SalesInvoiceBill,
    pub items: Vec<SalesInvoiceBillItem>,
    pub payments: Vec<Payment>,
    #[serde(rename = "adjustment")]
    pub adjustments: Vec<SalesInvoiceAdjustment>,
}

// =============================================================================
// Totals
// =============================================================================

/// Everything the header row stores, computed from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    /// One amount per request item, in request order.
    pub line_amounts: Vec<Money>,
    pub subtotal: Money,
    pub total_quantity: i64,
    pub discount: Money,
    pub taxable: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub adjustments: Money,
    pub total: Money,
    pub paid: Money,
    pub amount_due: Money,
    pub refund: Money,
}

impl InvoiceTotals {
    #[inline]
    pub fn tax(&self) -> Money {
        self.cgst + self.sgst
    }
}

/// Header discount, capped at the subtotal.
pub fn header_discount(
    subtotal: Money,
    discount_type: Option<DiscountType>,
    discount_value: i64,
) -> Money {
    let discount = match discount_type {
        None => Money::zero(),
        Some(DiscountType::Percentage) => {
            subtotal.percentage(discount_value.clamp(0, u32::MAX as i64) as u32)
        }
        Some(DiscountType::Amount) => Money::from_cents(discount_value),
    };
    discount.non_negative().min(subtotal.non_negative())
}

/// Runs the totals pipeline over a validated request.
///
/// ## Example
/// ```rust
/// use karat_core::invoice::{compute_totals, InvoiceRequest};
/// use karat_core::EngineSettings;
///
/// let request: InvoiceRequest = serde_json::from_value(serde_json::json!({
///     "header": {
///         "invoice_date": "2024-06-01",
///         "branch_id": "b1",
///         "discount_type": "percentage",
///         "discount_value": 1000,
///         "cgst_cents": 900,
///         "sgst_cents": 900
///     },
///     "items": [{ "product_id": "p1", "quantity": 10, "rate_cents": 10000 }],
///     "payments": [{ "mode": "cash", "amount_cents": 91800 }]
/// })).unwrap();
///
/// let totals = compute_totals(&request, &EngineSettings::default()).unwrap();
/// assert_eq!(totals.total.major(), 918);
/// assert!(totals.amount_due.is_zero() && totals.refund.is_zero());
/// ```
pub fn compute_totals(
    request: &InvoiceRequest,
    settings: &EngineSettings,
) -> CoreResult<InvoiceTotals> {
    let header = &request.header;

    let line_amounts = request
        .items
        .iter()
        .map(InvoiceItemInput::amount)
        .collect::<CoreResult<Vec<Money>>>()?;
    let subtotal =
        Money::checked_sum(line_amounts.iter().copied()).ok_or_else(|| out_of_range("subtotal"))?;
    let total_quantity = request
        .items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.quantity))
        .ok_or_else(|| out_of_range("total quantity"))?;

    let discount = header_discount(subtotal, header.discount_type, header.discount_value);
    let taxable = subtotal - discount;
    let cgst = Money::from_cents(header.cgst_cents);
    let sgst = Money::from_cents(header.sgst_cents);
    let mut total = Money::checked_sum([taxable, cgst, sgst]).ok_or_else(|| out_of_range("total"))?;

    let adjustments = Money::checked_sum(
        request
            .adjustments
            .iter()
            .map(|a| Money::from_cents(a.amount_cents)),
    )
    .ok_or_else(|| out_of_range("adjustment amount"))?;
    if adjustments > total {
        return Err(CoreError::AdjustmentExceedsTotal {
            adjustments: adjustments.to_string(),
            total: total.to_string(),
        });
    }
    if !request.adjustments.is_empty() {
        total = (total - adjustments).non_negative().round_to_whole_units();
    }

    let (paid, amount_due, refund) = reconcile_payments(total, &request.payments)?;
    check_cash_limit(&request.payments, settings.cash_payment_limit)?;

    Ok(InvoiceTotals {
        line_amounts,
        subtotal,
        total_quantity,
        discount,
        taxable,
        cgst,
        sgst,
        adjustments,
        total,
        paid,
        amount_due,
        refund,
    })
}

/// Returns `(paid, due, refund)`. At most one of due and refund is non-zero.
pub fn reconcile_payments(
    total: Money,
    payments: &[PaymentInput],
) -> CoreResult<(Money, Money, Money)> {
    let paid = Money::checked_sum(payments.iter().map(|p| Money::from_cents(p.amount_cents)))
        .ok_or_else(|| out_of_range("payment amount"))?;
    if paid > total {
        Ok((paid, Money::zero(), paid - total))
    } else {
        Ok((paid, total - paid, Money::zero()))
    }
}

/// Rejects the request when cash receipts reach the statutory threshold,
/// whatever other tenders are present.
pub fn check_cash_limit(payments: &[PaymentInput], limit: Money) -> CoreResult<()> {
    let cash = Money::checked_sum(
        payments
            .iter()
            .filter(|p| p.mode.is_cash())
            .map(|p| Money::from_cents(p.amount_cents)),
    )
    .ok_or_else(|| out_of_range("payment amount"))?;
    if cash >= limit {
        return Err(CoreError::CashLimitExceeded {
            cash: cash.to_string(),
            limit: limit.to_string(),
        });
    }
    Ok(())
}

fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_AMOUNT_CENTS,
    }
    .into()
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Checks that `existing` may be updated into `next`.
///
/// Finalized invoices are immutable; cancelled ones are closed.
pub fn ensure_updatable(existing: &SalesInvoiceBill, next: InvoiceStatus) -> CoreResult<()> {
    if existing.status.is_final() {
        return Err(CoreError::InvoiceFinalized {
            invoice_no: existing.invoice_no.clone(),
        });
    }
    if !existing.status.can_move_to(next) {
        return Err(CoreError::InvalidStatusTransition {
            document: format!("invoice {}", existing.invoice_no),
            from: existing.status.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Child Reconciliation
// =============================================================================

/// How to bring stored child rows in line with an update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// `(payload index, existing id)` rows to update in place.
    pub update: Vec<(usize, String)>,
    /// Payload indexes without an id, inserted fresh.
    pub insert: Vec<usize>,
    /// Stored ids absent from the payload.
    pub remove: Vec<String>,
}

/// Matches payload rows to stored rows by id.
///
/// An id that is not among the stored rows, or that appears twice, is
/// rejected.
pub fn plan_reconcile(
    entity: &str,
    existing: &[String],
    incoming: &[Option<String>],
) -> CoreResult<ReconcilePlan> {
    let stored: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = ReconcilePlan::default();

    for (index, id) in incoming.iter().enumerate() {
        match id.as_deref() {
            Some(id) => {
                if !stored.contains(id) {
                    return Err(CoreError::not_found(entity, id));
                }
                if !seen.insert(id) {
                    return Err(ValidationError::InvalidFormat {
                        field: format!("{entity} id"),
                        reason: format!("'{id}' appears more than once"),
                    }
                    .into());
                }
                plan.update.push((index, id.to_string()));
            }
            None => plan.insert.push(index),
        }
    }

    plan.remove = existing
        .iter()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect();

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> InvoiceHeaderInput {
        InvoiceHeaderInput {
            invoice_no: Some("INV-1".to_string()),
            invoice_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            branch_id: "branch-1".to_string(),
            customer_id: None,
            status: InvoiceStatus::Draft,
            discount_type: None,
            discount_value: 0,
            cgst_cents: 0,
            sgst_cents: 0,
            remarks: None,
        }
    }

    fn item(quantity: i64, rate_cents: i64, discount_cents: i64) -> InvoiceItemInput {
        InvoiceItemInput {
            id: None,
            product_id: "product-1".to_string(),
            product_item_detail_id: None,
            quantity,
            rate_cents,
            discount_cents,
        }
    }

    fn payment(mode: PaymentMode, amount_cents: i64) -> PaymentInput {
        PaymentInput {
            id: None,
            mode,
            amount_cents,
            reference: None,
        }
    }

    fn adjustment(reference_id: &str, amount_cents: i64) -> AdjustmentInput {
        AdjustmentInput {
            id: None,
            adjustment_type: AdjustmentType::SalesReturn,
            reference_id: reference_id.to_string(),
            amount_cents,
        }
    }

    /// 10 × ₹100, 10% off, CGST ₹9, SGST ₹9.
    fn worked_example() -> InvoiceRequest {
        let mut h = header();
        h.discount_type = Some(DiscountType::Percentage);
        h.discount_value = 1000;
        h.cgst_cents = 900;
        h.sgst_cents = 900;
        InvoiceRequest {
            header: h,
            items: vec![item(10, 10_000, 0)],
            payments: vec![payment(PaymentMode::Cash, 91_800)],
            adjustments: vec![],
        }
    }

    #[test]
    fn test_worked_example_totals() {
        let request = worked_example();
        request.validate().unwrap();
        let totals = compute_totals(&request, &EngineSettings::default()).unwrap();

        assert_eq!(totals.line_amounts, vec![Money::from_major(1000)]);
        assert_eq!(totals.subtotal, Money::from_major(1000));
        assert_eq!(totals.discount, Money::from_major(100));
        assert_eq!(totals.taxable, Money::from_major(900));
        assert_eq!(totals.total, Money::from_major(918));
        assert_eq!(totals.tax(), Money::from_major(18));
        assert!(totals.amount_due.is_zero());
        assert!(totals.refund.is_zero());
        assert_eq!(totals.total_quantity, 10);
    }

    #[test]
    fn test_cash_at_limit_is_rejected_regardless_of_total() {
        let mut request = worked_example();
        request.payments = vec![
            payment(PaymentMode::Cash, 15_000_000),
            payment(PaymentMode::Cash, 15_000_000),
        ];
        let err = compute_totals(&request, &EngineSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::CashLimitExceeded { .. }));
        assert!(err.to_string().contains("PAN"));

        // Exactly at the limit is also rejected, card alongside does not matter
        request.payments = vec![
            payment(PaymentMode::Cash, 20_000_000),
            payment(PaymentMode::Card, 100),
        ];
        assert!(compute_totals(&request, &EngineSettings::default()).is_err());

        // Large card payment alone is fine
        request.payments = vec![payment(PaymentMode::Card, 30_000_000)];
        let totals = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert!(totals.refund.is_positive());
    }

    #[test]
    fn test_due_and_refund_are_exclusive() {
        let mut request = worked_example();

        request.payments = vec![payment(PaymentMode::Upi, 50_000)];
        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert_eq!(t.amount_due.cents(), 41_800);
        assert!(t.refund.is_zero());

        request.payments = vec![payment(PaymentMode::Cash, 100_000)];
        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert!(t.amount_due.is_zero());
        assert_eq!(t.refund.cents(), 8_200);

        request.payments = vec![];
        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert_eq!(t.amount_due, t.total);
    }

    #[test]
    fn test_adjustments_reduce_and_round_total() {
        let mut request = worked_example();
        request.header.cgst_cents = 925; // total 918.25
        request.adjustments = vec![adjustment("sr-1", 10_075)]; // 100.75

        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        // 918.25 − 100.75 = 817.50 → 818
        assert_eq!(t.total.cents(), 81_800);
        assert_eq!(t.adjustments.cents(), 10_075);
    }

    #[test]
    fn test_total_unrounded_without_adjustments() {
        let mut request = worked_example();
        request.header.cgst_cents = 925;
        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert_eq!(t.total.cents(), 91_825);
    }

    #[test]
    fn test_adjustments_exceeding_total_rejected() {
        let mut request = worked_example();
        request.adjustments = vec![adjustment("sr-1", 91_801)];
        let err = compute_totals(&request, &EngineSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::AdjustmentExceedsTotal { .. }));

        request.adjustments = vec![adjustment("sr-1", 91_800)];
        let t = compute_totals(&request, &EngineSettings::default()).unwrap();
        assert!(t.total.is_zero());
    }

    #[test]
    fn test_header_discount_is_capped() {
        let subtotal = Money::from_major(1000);
        assert_eq!(
            header_discount(subtotal, Some(DiscountType::Amount), 500_000),
            subtotal
        );
        assert_eq!(
            header_discount(subtotal, Some(DiscountType::Percentage), 20_000),
            subtotal
        );
        assert_eq!(
            header_discount(subtotal, Some(DiscountType::Amount), 2_500),
            Money::from_major(25)
        );
        assert!(header_discount(subtotal, None, 1000).is_zero());
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let mut request = worked_example();
        request.items.clear();
        assert!(matches!(
            request.validate(),
            Err(CoreError::EmptyItems { .. })
        ));

        let mut request = worked_example();
        request.items = vec![item(0, 10_000, 0)];
        assert!(request.validate().is_err());

        let mut request = worked_example();
        request.items = vec![item(1, 10_000, 10_001)];
        assert!(request.validate().is_err());

        let mut request = worked_example();
        request.payments = vec![payment(PaymentMode::Cash, 0)];
        assert!(request.validate().is_err());

        let mut request = worked_example();
        request.adjustments = vec![adjustment("sr-1", 100), adjustment("sr-1", 200)];
        assert!(matches!(
            request.validate(),
            Err(CoreError::DuplicateAdjustment { .. })
        ));
    }

    #[test]
    fn test_oversized_amounts_are_rejected_not_overflowed() {
        let mut request = worked_example();
        request.items = vec![item(100, 1 << 62, 0)];
        let err = request.validate().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        // Each field in range, product over the line bound
        let mut request = worked_example();
        request.items = vec![item(100_000, MAX_AMOUNT_CENTS, 0)];
        assert!(matches!(
            request.validate(),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        let half = i64::MAX / 2 + 1;
        let mut request = worked_example();
        request.payments = vec![
            payment(PaymentMode::Card, half),
            payment(PaymentMode::Card, half),
        ];
        assert!(request.validate().is_err());
        let err = compute_totals(&request, &EngineSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        let mut request = worked_example();
        request.items = vec![item(2, i64::MAX, 0)];
        assert!(compute_totals(&request, &EngineSettings::default()).is_err());
    }

    #[test]
    fn test_request_accepts_singular_payment_key() {
        let request: InvoiceRequest = serde_json::from_value(serde_json::json!({
            "header": { "invoice_date": "2024-06-01", "branch_id": "b1" },
            "items": [{ "product_id": "p1", "quantity": 1, "rate_cents": 100 }],
            "payment": [{ "mode": "upi", "amount_cents": 100 }],
            "adjustments": [{ "adjustment_type": 2, "reference_id": "oj-1", "amount_cents": 50 }]
        }))
        .unwrap();
        assert_eq!(request.payments.len(), 1);
        assert_eq!(request.adjustments[0].adjustment_type, AdjustmentType::OldJewel);
        assert_eq!(request.header.status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_plan_reconcile() {
        let existing = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let incoming = vec![Some("b".to_string()), None, Some("a".to_string())];

        let plan = plan_reconcile("Invoice item", &existing, &incoming).unwrap();
        assert_eq!(plan.update, vec![(0, "b".to_string()), (2, "a".to_string())]);
        assert_eq!(plan.insert, vec![1]);
        assert_eq!(plan.remove, vec!["c".to_string()]);

        let unknown = vec![Some("z".to_string())];
        assert!(matches!(
            plan_reconcile("Invoice item", &existing, &unknown),
            Err(CoreError::NotFound { .. })
        ));

        let twice = vec![Some("a".to_string()), Some("a".to_string())];
        assert!(plan_reconcile("Invoice item", &existing, &twice).is_err());
    }
}
