//! # Pricing Engine
//!
//! Derives the selling price and the tax-inclusive final price of one stock
//! unit from catalog and material data.
//!
//! ## Price Build-up
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit rate     Piece Rate   → max(item rate/g, material rate/g)        │
//! │                Weight Based → material rate/g                          │
//! │                                                                         │
//! │  contribution  = unit rate × net weight                                │
//! │  making        = Amount | PerGram × net | Percentage of contribution   │
//! │  wastage       = Amount | PerGram × net | Percentage of contribution   │
//! │                                                                         │
//! │  selling price = contribution + making + wastage + stones + charges    │
//! │                                                                         │
//! │  final price   Piece Rate   → selling + tax(selling)                   │
//! │                Weight Based → base = material rate × net               │
//! │                               making/wastage % re-applied to base      │
//! │                               pre-tax = base + making + wastage        │
//! │                                         + stones + charges             │
//! │                               final = pre-tax + tax(pre-tax)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages apply to the material value, never to a price that already
//! contains other charges. A missing material rate prices the metal at zero.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Charge, ItemCharge, PricingMode, Product, ProductItemDetail, TaxRate};
use crate::weight::Weight;

// =============================================================================
// Input
// =============================================================================

/// Everything the engine needs to price one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingInput {
    pub mode: PricingMode,
    pub net_weight: Weight,
    /// Item's stored per-gram rate (used by Piece Rate only).
    pub item_rate: Money,
    /// Published material price per gram; `None` when the material is unknown.
    pub material_rate: Option<Money>,
    pub making_charge: Charge,
    pub wastage: Charge,
    pub stone_value: Money,
    pub additional_charges: Vec<Money>,
}

impl PricingInput {
    /// Builds the input from stored catalog rows.
    pub fn from_rows(
        product: &Product,
        item: &ProductItemDetail,
        material_rate: Option<Money>,
        charges: &[ItemCharge],
    ) -> Self {
        Self {
            mode: product.pricing_mode,
            net_weight: item.net_weight(),
            item_rate: item.rate_per_gram(),
            material_rate,
            making_charge: item.making_charge(),
            wastage: item.wastage(),
            stone_value: item.stone_value(),
            additional_charges: charges
                .iter()
                .map(|c| Money::from_cents(c.amount_cents))
                .collect(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Price breakdown for one stock unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub unit_rate: Money,
    pub contribution: Money,
    pub making_charge: Money,
    pub wastage: Money,
    pub stone_value: Money,
    pub additional_charges: Money,
    pub selling_price: Money,
    pub tax: Money,
    pub final_price: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Resolves a making-charge or wastage against a net weight and the
/// material contribution it is a percentage of.
pub fn resolve_charge(charge: Charge, net_weight: Weight, contribution: Money) -> Money {
    match charge {
        Charge::Amount(amount) => amount,
        Charge::PerGram(rate) => rate.times_weight(net_weight),
        Charge::Percentage(bps) => contribution.percentage(bps),
    }
}

/// Prices one unit.
///
/// ## Example
/// ```rust
/// use karat_core::money::Money;
/// use karat_core::pricing::{quote, PricingInput};
/// use karat_core::types::{Charge, PricingMode, TaxRate};
/// use karat_core::weight::Weight;
///
/// let input = PricingInput {
///     mode: PricingMode::WeightBased,
///     net_weight: Weight::from_grams(2, 0),
///     item_rate: Money::zero(),
///     material_rate: Some(Money::from_major(6_000)),
///     making_charge: Charge::Amount(Money::from_major(1_000)),
///     wastage: Charge::Percentage(0),
///     stone_value: Money::zero(),
///     additional_charges: vec![],
/// };
/// let q = quote(&input, TaxRate::from_bps(300));
/// assert_eq!(q.selling_price, Money::from_major(13_000));
/// assert_eq!(q.final_price, Money::from_major(13_390));
/// ```
pub fn quote(input: &PricingInput, tax_rate: TaxRate) -> PriceQuote {
    let material_rate = input.material_rate.unwrap_or_default();
    let unit_rate = match input.mode {
        PricingMode::PieceRate => input.item_rate.max(material_rate),
        PricingMode::WeightBased => material_rate,
    };

    let contribution = unit_rate.times_weight(input.net_weight);
    let making_charge = resolve_charge(input.making_charge, input.net_weight, contribution);
    let wastage = resolve_charge(input.wastage, input.net_weight, contribution);
    let additional_charges: Money = input.additional_charges.iter().sum();

    let selling_price =
        contribution + making_charge + wastage + input.stone_value + additional_charges;

    let (tax, final_price) = match input.mode {
        PricingMode::PieceRate => {
            let tax = selling_price.calculate_tax(tax_rate);
            (tax, selling_price + tax)
        }
        PricingMode::WeightBased => {
            let base = material_rate.times_weight(input.net_weight);
            let making = resolve_charge(input.making_charge, input.net_weight, base);
            let waste = resolve_charge(input.wastage, input.net_weight, base);
            let pre_tax = base + making + waste + input.stone_value + additional_charges;
            let tax = pre_tax.calculate_tax(tax_rate);
            (tax, pre_tax + tax)
        }
    };

    PriceQuote {
        unit_rate,
        contribution,
        making_charge,
        wastage,
        stone_value: input.stone_value,
        additional_charges,
        selling_price,
        tax,
        final_price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
