//! Engine settings injected at startup.
//!
//! The finished-goods tax rate and the cash threshold are configuration,
//! not literals, so a rate change is a restart rather than a rebuild.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxRate;

/// Default finished-goods tax: 3%.
pub const DEFAULT_FINISHED_GOODS_TAX_BPS: u32 = 300;

/// Default cash threshold above which a PAN reference is mandatory, in
/// whole currency units.
pub const DEFAULT_CASH_LIMIT_MAJOR: i64 = 200_000;

/// Tunables read by the pricing and invoice workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Tax added on top of the selling price of finished jewellery.
    pub finished_goods_tax: TaxRate,
    /// Cash receipts at or above this amount are refused.
    pub cash_payment_limit: Money,
}

impl EngineSettings {
    pub fn new(finished_goods_tax: TaxRate, cash_payment_limit: Money) -> Self {
        Self {
            finished_goods_tax,
            cash_payment_limit,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            finished_goods_tax: TaxRate::from_bps(DEFAULT_FINISHED_GOODS_TAX_BPS),
            cash_payment_limit: Money::from_major(DEFAULT_CASH_LIMIT_MAJOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.finished_goods_tax.bps(), 300);
        assert_eq!(settings.cash_payment_limit.cents(), 20_000_000);
    }
}
