//! # Order Pricing
//!
//! Pure aggregation of priced line items into order totals.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Order Pricing Flow                            │
//! │                                                                     │
//! │  per line:  unit price (frozen) × quantity                          │
//! │                  │                                                  │
//! │                  ▼                                                  │
//! │       resolve_line_discount() ──► line discount                     │
//! │                  │                                                  │
//! │                  ▼                                                  │
//! │  subtotal   = Σ unit_price × qty        (real lines only)           │
//! │  discount   = Σ line discounts + Σ free-product credits             │
//! │  tax        = (subtotal − discount) × tax rate                      │
//! │  total      = subtotal − discount + tax                             │
//! │                                                                     │
//! │  credits grouped by discount id ──► one OrderDiscount row each      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module owns the math only. Product lookup, stock reservation, and
//! persistence happen in warung-db around it.

use crate::discount::ResolvedDiscount;
use crate::money::Money;
use crate::types::TaxRate;

/// A real (customer-requested) line, priced and discounted.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
    pub notes: Option<String>,
}

impl PricedLine {
    /// Line subtotal: `unit_price × quantity − discount`.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity) - self.discount
    }
}

/// A synthetic free line granted by a substitution-mode BUY_X_GET_Y.
///
/// Shape is fixed: quantity 1, unit price 0, the free product's price as
/// the line discount, line subtotal 0.
#[derive(Debug, Clone)]
pub struct BonusLine {
    pub product_id: String,
    pub name: String,
    /// The free product's regular price - recorded as the amount saved.
    pub credit: Money,
}

/// Savings attributed to one discount across the whole order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCredit {
    pub discount_id: String,
    pub amount_saved: Money,
}

/// The four order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Accumulates priced lines and produces order totals.
///
/// ## Invariants Maintained
/// - `total == subtotal − discount + tax`, by construction
/// - order discount equals the sum of the grouped credits
/// - bonus lines never contribute to the subtotal
#[derive(Debug, Default)]
pub struct OrderPricing {
    lines: Vec<PricedLine>,
    bonuses: Vec<BonusLine>,
    credits: Vec<DiscountCredit>,
}

impl OrderPricing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a real line with its resolved discount (if any).
    pub fn add_line(
        &mut self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        discount: Option<ResolvedDiscount>,
        notes: Option<String>,
    ) {
        let discount_amount = match discount {
            Some(resolved) => {
                self.credit(resolved.discount_id, resolved.amount);
                resolved.amount
            }
            None => Money::zero(),
        };

        self.lines.push(PricedLine {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            unit_price,
            discount: discount_amount,
            notes,
        });
    }

    /// Adds a substitution-mode bonus line, crediting the free product's
    /// price to the granting discount.
    pub fn add_bonus(
        &mut self,
        discount_id: impl Into<String>,
        product_id: impl Into<String>,
        name: impl Into<String>,
        credit: Money,
    ) {
        self.credit(discount_id.into(), credit);
        self.bonuses.push(BonusLine {
            product_id: product_id.into(),
            name: name.into(),
            credit,
        });
    }

    /// Folds a saving into the per-discount credit map, keeping first-seen
    /// order so persisted OrderDiscount rows are deterministic.
    fn credit(&mut self, discount_id: String, amount: Money) {
        match self.credits.iter_mut().find(|c| c.discount_id == discount_id) {
            Some(existing) => existing.amount_saved += amount,
            None => self.credits.push(DiscountCredit {
                discount_id,
                amount_saved: amount,
            }),
        }
    }

    /// Computes the order totals at the given tax rate.
    ///
    /// Tax applies to the discounted base, not the raw subtotal.
    pub fn totals(&self, tax_rate: TaxRate) -> OrderTotals {
        let subtotal = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.unit_price.multiply_quantity(l.quantity));

        let discount = self
            .credits
            .iter()
            .fold(Money::zero(), |acc, c| acc + c.amount_saved);

        let tax = (subtotal - discount).calculate_tax(tax_rate);
        let total = subtotal - discount + tax;

        OrderTotals {
            subtotal,
            discount,
            tax,
            total,
        }
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    pub fn bonuses(&self) -> &[BonusLine] {
        &self.bonuses
    }

    /// Per-discount savings, one entry per discount actually used.
    pub fn discount_credits(&self) -> &[DiscountCredit] {
        &self.credits
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(id: &str, cents: i64) -> ResolvedDiscount {
        ResolvedDiscount {
            discount_id: id.to_string(),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_single_line_percentage_scenario() {
        // price 10 000, qty 3, 10% discount ⇒ discount 3 000, line 27 000
        let mut pricing = OrderPricing::new();
        pricing.add_line(
            "p1",
            "Nasi Goreng",
            3,
            Money::from_cents(10_000),
            Some(resolved("d1", 3_000)),
            None,
        );

        assert_eq!(pricing.lines()[0].subtotal().cents(), 27_000);

        let totals = pricing.totals(TaxRate::from_bps(1100));
        assert_eq!(totals.subtotal.cents(), 30_000);
        assert_eq!(totals.discount.cents(), 3_000);
        assert_eq!(totals.tax.cents(), 2_970); // 11% of 27 000
        assert_eq!(totals.total.cents(), 29_970);
    }

    #[test]
    fn test_total_invariant_holds() {
        let mut pricing = OrderPricing::new();
        pricing.add_line("p1", "A", 2, Money::from_cents(12_345), Some(resolved("d1", 678)), None);
        pricing.add_line("p2", "B", 1, Money::from_cents(9_999), None, None);

        let totals = pricing.totals(TaxRate::from_bps(825));
        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount + totals.tax
        );
    }

    #[test]
    fn test_credits_grouped_by_discount() {
        // Two lines served by the same discount collapse into one credit.
        let mut pricing = OrderPricing::new();
        pricing.add_line("p1", "A", 1, Money::from_cents(10_000), Some(resolved("d1", 1_000)), None);
        pricing.add_line("p2", "B", 1, Money::from_cents(20_000), Some(resolved("d1", 2_000)), None);
        pricing.add_line("p3", "C", 1, Money::from_cents(5_000), Some(resolved("d2", 500)), None);

        let credits = pricing.discount_credits();
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].discount_id, "d1");
        assert_eq!(credits[0].amount_saved.cents(), 3_000);
        assert_eq!(credits[1].amount_saved.cents(), 500);
    }

    #[test]
    fn test_bonus_line_excluded_from_subtotal() {
        let mut pricing = OrderPricing::new();
        pricing.add_line("p1", "Teh Botol", 2, Money::from_cents(5_000), None, None);
        pricing.add_bonus("d-sub", "p2", "Kerupuk", Money::from_cents(3_000));

        let totals = pricing.totals(TaxRate::zero());
        // Bonus line adds nothing to subtotal but its credit reduces total
        assert_eq!(totals.subtotal.cents(), 10_000);
        assert_eq!(totals.discount.cents(), 3_000);
        assert_eq!(totals.total.cents(), 7_000);
        assert_eq!(pricing.bonuses().len(), 1);
    }

    #[test]
    fn test_order_discount_sum_matches_order_discount_amount() {
        let mut pricing = OrderPricing::new();
        pricing.add_line("p1", "A", 3, Money::from_cents(10_000), Some(resolved("d1", 3_000)), None);
        pricing.add_bonus("d2", "p9", "Free", Money::from_cents(4_000));

        let totals = pricing.totals(TaxRate::from_bps(1100));
        let credit_sum: i64 = pricing
            .discount_credits()
            .iter()
            .map(|c| c.amount_saved.cents())
            .sum();
        assert_eq!(totals.discount.cents(), credit_sum);
    }

    #[test]
    fn test_empty_pricing() {
        let pricing = OrderPricing::new();
        assert!(pricing.is_empty());
        let totals = pricing.totals(TaxRate::from_bps(1100));
        assert_eq!(totals.total, Money::zero());
    }
}
