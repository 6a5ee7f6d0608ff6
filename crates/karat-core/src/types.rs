//! # Domain Types
//!
//! Core domain types used throughout the Karat engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                    Billing                    Logistics        │
//! │  ───────                    ───────                    ─────────        │
//! │  Product ─┐                 SalesInvoiceBill ─┐        StockTransfer ─┐ │
//! │           │ 1..n            │ items           │        │ items        │ │
//! │  ProductItemDetail          SalesInvoiceBillItem       StockTransferItem│
//! │   (quantity = stock)        Payment                    Tracking (1:1)  │
//! │  ItemCharge                 SalesInvoiceAdjustment     StatusHistory   │
//! │                              └─► SalesReturn | OldJewel  (append-only) │
//! │                                                                         │
//! │  Masters: Branch, Material (published price per gram)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID: (sku, invoice_no, transfer_no) - human-readable
//!
//! ## Units
//! `*_cents` fields are paise, `*_mg` fields are milligrams, `*_bps` fields
//! are basis points.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::weight::Weight;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 300 bps = 3% (GST on finished jewellery)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Enums
// =============================================================================

/// How a product's metal value is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Metal value follows the published material rate.
    #[serde(alias = "Weight Based")]
    WeightBased,
    /// Metal value uses the higher of the item's stored rate and the published rate.
    #[serde(alias = "Piece Rate")]
    PieceRate,
}

/// How a making-charge or wastage value is interpreted.
///
/// ```text
/// Amount      value = paise, flat
/// PerGram     value = paise per gram × net weight
/// Percentage  value = bps of the material contribution
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChargeMode {
    Amount,
    #[serde(alias = "Per Gram")]
    PerGram,
    Percentage,
}

/// Lifecycle of a sales invoice.
///
/// ```text
///   Draft ──► Printed ──► Invoice (terminal, immutable)
///     ▲  ╲       │
///     │   ╲      ▼
///     └── On Hold          any non-terminal ──► Cancelled (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Printed,
    Invoice,
    #[serde(alias = "On Hold")]
    OnHold,
    Cancelled,
}

impl InvoiceStatus {
    /// Finalized invoices deduct stock and lock credits.
    #[inline]
    pub fn is_final(&self) -> bool {
        matches!(self, InvoiceStatus::Invoice)
    }

    /// Terminal states accept no further updates.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Invoice | InvoiceStatus::Cancelled)
    }

    /// Whether an update may move an invoice from `self` to `next`.
    pub fn can_move_to(&self, next: InvoiceStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        !(matches!(self, InvoiceStatus::Printed) && matches!(next, InvoiceStatus::Draft))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Printed => "printed",
            InvoiceStatus::Invoice => "invoice",
            InvoiceStatus::OnHold => "on_hold",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

/// Header-level discount interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is basis points of the subtotal.
    Percentage,
    /// `discount_value` is paise.
    Amount,
}

/// Tender used for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Cheque,
}

impl PaymentMode {
    #[inline]
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMode::Cash)
    }
}

/// The kind of credit document an adjustment draws on.
///
/// Encoded as an integer on the wire and in the store: `1` sales return,
/// `2` old-jewel exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum AdjustmentType {
    SalesReturn = 1,
    OldJewel = 2,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::SalesReturn => "sales_return",
            AdjustmentType::OldJewel => "old_jewel",
        }
    }
}

impl TryFrom<i32> for AdjustmentType {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AdjustmentType::SalesReturn),
            2 => Ok(AdjustmentType::OldJewel),
            _ => Err(ValidationError::NotAllowed {
                field: "adjustment_type".to_string(),
                allowed: vec!["1".to_string(), "2".to_string()],
            }),
        }
    }
}

impl From<AdjustmentType> for i32 {
    fn from(value: AdjustmentType) -> Self {
        value as i32
    }
}

/// Status of a stock transfer. Moves strictly forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum TransferStatus {
    Pending = 1,
    Dispatched = 2,
    Delivered = 3,
}

impl TransferStatus {
    #[inline]
    pub fn id(&self) -> i32 {
        *self as i32
    }

    /// The only status this one may move to.
    pub fn successor(&self) -> Option<TransferStatus> {
        match self {
            TransferStatus::Pending => Some(TransferStatus::Dispatched),
            TransferStatus::Dispatched => Some(TransferStatus::Delivered),
            TransferStatus::Delivered => None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Dispatched => "dispatched",
            TransferStatus::Delivered => "delivered",
        }
    }
}

impl TryFrom<i32> for TransferStatus {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TransferStatus::Pending),
            2 => Ok(TransferStatus::Dispatched),
            3 => Ok(TransferStatus::Delivered),
            _ => Err(ValidationError::OutOfRange {
                field: "status_id".to_string(),
                min: 1,
                max: 3,
            }),
        }
    }
}

impl From<TransferStatus> for i32 {
    fn from(value: TransferStatus) -> Self {
        value as i32
    }
}

// =============================================================================
// Masters
// =============================================================================

/// A retail branch. Reference data owned by the masters module.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Branch {
    pub id: String,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A material type (22K gold, 925 silver, ...) with its published rate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Material {
    pub id: String,
    pub name: String,
    /// Published price per gram in paise.
    pub price_per_gram_cents: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Material {
    #[inline]
    pub fn price_per_gram(&self) -> Money {
        Money::from_cents(self.price_per_gram_cents)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A catalog entry. Stock lives on its [`ProductItemDetail`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub hsn_code: Option<String>,
    pub name: String,
    pub material_id: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub pricing_mode: PricingMode,
    /// Owning branch.
    pub branch_id: String,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A stock-bearing lot or variation of a product.
///
/// `quantity` is the single source of truth for stock and never goes
/// negative. Only finalized invoices and transfers change it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductItemDetail {
    pub id: String,
    pub product_id: String,
    pub sku: String,
    pub quantity: i64,
    pub net_weight_mg: i64,
    pub gross_weight_mg: i64,
    pub stone_value_cents: i64,
    /// Stored per-gram rate used by piece-rate pricing.
    pub rate_per_gram_cents: i64,
    pub making_charge_mode: ChargeMode,
    pub making_charge_value: i64,
    pub wastage_mode: ChargeMode,
    pub wastage_value: i64,
    /// Created at a destination branch by a stock transfer.
    pub is_transfer_item: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductItemDetail {
    #[inline]
    pub fn net_weight(&self) -> Weight {
        Weight::from_mg(self.net_weight_mg)
    }

    #[inline]
    pub fn gross_weight(&self) -> Weight {
        Weight::from_mg(self.gross_weight_mg)
    }

    #[inline]
    pub fn stone_value(&self) -> Money {
        Money::from_cents(self.stone_value_cents)
    }

    #[inline]
    pub fn rate_per_gram(&self) -> Money {
        Money::from_cents(self.rate_per_gram_cents)
    }

    #[inline]
    pub fn making_charge(&self) -> Charge {
        Charge::new(self.making_charge_mode, self.making_charge_value)
    }

    #[inline]
    pub fn wastage(&self) -> Charge {
        Charge::new(self.wastage_mode, self.wastage_value)
    }
}

/// A making-charge or wastage value with its interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charge {
    Amount(Money),
    PerGram(Money),
    /// Basis points of the material contribution.
    Percentage(u32),
}

impl Charge {
    /// Builds a charge from its stored (mode, value) pair.
    ///
    /// Negative percentages are clamped to zero.
    pub fn new(mode: ChargeMode, value: i64) -> Self {
        match mode {
            ChargeMode::Amount => Charge::Amount(Money::from_cents(value)),
            ChargeMode::PerGram => Charge::PerGram(Money::from_cents(value)),
            ChargeMode::Percentage => Charge::Percentage(value.clamp(0, u32::MAX as i64) as u32),
        }
    }
}

/// An item-level additional charge (hallmarking, certification, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemCharge {
    pub id: String,
    pub product_item_detail_id: String,
    pub label: String,
    pub amount_cents: i64,
}

/// Free-form attribute row attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductAdditionalDetail {
    pub id: String,
    pub product_id: String,
    pub label: String,
    pub value: String,
}

/// Association between a product and a variant master.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    pub variant_id: String,
}

/// Association between a product and an add-on master.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductAddOn {
    pub id: String,
    pub product_id: String,
    pub add_on_id: String,
}

// =============================================================================
// Credit Documents
// =============================================================================

/// A sales return whose value may be credited against a later invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesReturn {
    pub id: String,
    pub return_no: String,
    pub amount_cents: i64,
    /// Set once an invoice consumes this credit.
    pub is_bill_adjusted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Old jewellery taken in exchange; its value may be credited once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OldJewel {
    pub id: String,
    pub voucher_no: String,
    pub amount_cents: i64,
    pub is_bill_adjusted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales Invoice
// =============================================================================

/// Sales invoice header.
///
/// Immutable once `status` is [`InvoiceStatus::Invoice`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesInvoiceBill {
    pub id: String,
    pub invoice_no: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub branch_id: String,
    pub customer_id: Option<String>,
    pub status: InvoiceStatus,
    pub discount_type: Option<DiscountType>,
    /// bps for percentage discounts, paise for amount discounts.
    pub discount_value: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub cgst_cents: i64,
    pub sgst_cents: i64,
    pub tax_cents: i64,
    pub adjustment_cents: i64,
    pub total_cents: i64,
    pub total_quantity: i64,
    pub paid_cents: i64,
    pub amount_due_cents: i64,
    pub refund_cents: i64,
    pub remarks: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl SalesInvoiceBill {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn amount_due(&self) -> Money {
        Money::from_cents(self.amount_due_cents)
    }

    #[inline]
    pub fn refund(&self) -> Money {
        Money::from_cents(self.refund_cents)
    }
}

/// A line item on an invoice.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesInvoiceBillItem {
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    pub product_item_detail_id: Option<String>,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    pub rate_cents: i64,
    pub discount_cents: i64,
    /// `quantity × rate − discount`.
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A payment towards an invoice. Split tender is normal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub mode: PaymentMode,
    pub amount_cents: i64,
    /// External reference (card auth code, UPI ref, cheque number).
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A credit applied against an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesInvoiceAdjustment {
    pub id: String,
    pub invoice_id: String,
    #[ts(type = "number")]
    pub adjustment_type: AdjustmentType,
    /// Id of the referenced SalesReturn or OldJewel row.
    pub reference_id: String,
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Transfer
// =============================================================================

/// Header of a branch-to-branch stock movement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransfer {
    pub id: String,
    pub transfer_no: String,
    #[ts(as = "String")]
    pub transfer_date: NaiveDate,
    pub branch_from: String,
    pub branch_to: String,
    #[ts(type = "number")]
    pub status_id: TransferStatus,
    pub remarks: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One transferred line, stamped with where the stock landed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransferItem {
    pub id: String,
    pub stock_transfer_id: String,
    pub product_id: String,
    pub product_item_detail_id: String,
    pub transfer_quantity: i64,
    pub destination_product_id: Option<String>,
    pub destination_item_id: Option<String>,
    /// `merge` or `clone`.
    pub resolution: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Current-state projection of a transfer's movement. One row per transfer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransferTracking {
    pub id: String,
    pub stock_transfer_id: String,
    #[ts(as = "String")]
    pub dispatch_date: NaiveDate,
    pub dispatched_by: Option<String>,
    pub vehicle_no: Option<String>,
    pub dispatch_remarks: Option<String>,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub delivery_remarks: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit row, one per status change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockTransferStatusHistory {
    pub id: String,
    pub stock_transfer_id: String,
    #[ts(type = "number")]
    pub status_id: TransferStatus,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(300);
        assert_eq!(rate.bps(), 300);
        assert!((rate.percentage() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_invoice_status_moves() {
        use InvoiceStatus::*;
        assert!(Draft.can_move_to(Invoice));
        assert!(Draft.can_move_to(OnHold));
        assert!(OnHold.can_move_to(Draft));
        assert!(Printed.can_move_to(Invoice));
        assert!(!Printed.can_move_to(Draft));
        assert!(!Invoice.can_move_to(Cancelled));
        assert!(!Cancelled.can_move_to(Draft));
        assert!(Invoice.is_terminal() && Cancelled.is_terminal());
        assert!(!OnHold.is_terminal());
        assert_eq!(InvoiceStatus::default(), Draft);
    }

    #[test]
    fn test_invoice_status_accepts_display_names() {
        let status: InvoiceStatus = serde_json::from_str("\"On Hold\"").unwrap();
        assert_eq!(status, InvoiceStatus::OnHold);
        let mode: PricingMode = serde_json::from_str("\"Piece Rate\"").unwrap();
        assert_eq!(mode, PricingMode::PieceRate);
    }

    #[test]
    fn test_adjustment_type_wire_format() {
        let t: AdjustmentType = serde_json::from_str("2").unwrap();
        assert_eq!(t, AdjustmentType::OldJewel);
        assert_eq!(serde_json::to_string(&AdjustmentType::SalesReturn).unwrap(), "1");
        assert!(serde_json::from_str::<AdjustmentType>("3").is_err());
    }

    #[test]
    fn test_transfer_status_successor() {
        assert_eq!(
            TransferStatus::Pending.successor(),
            Some(TransferStatus::Dispatched)
        );
        assert_eq!(
            TransferStatus::Dispatched.successor(),
            Some(TransferStatus::Delivered)
        );
        assert!(TransferStatus::Delivered.is_terminal());
        assert_eq!(TransferStatus::try_from(3).unwrap().id(), 3);
        assert!(TransferStatus::try_from(0).is_err());
    }

    #[test]
    fn test_charge_from_stored_pair() {
        assert_eq!(
            Charge::new(ChargeMode::Percentage, 1200),
            Charge::Percentage(1200)
        );
        assert_eq!(Charge::new(ChargeMode::Percentage, -5), Charge::Percentage(0));
        assert_eq!(
            Charge::new(ChargeMode::Amount, 50_000),
            Charge::Amount(Money::from_cents(50_000))
        );
    }
}
