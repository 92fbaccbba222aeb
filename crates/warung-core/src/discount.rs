//! # Discount Resolution Engine
//!
//! Given the discounts linked to a product, a quantity, and a unit price,
//! decide the best applicable discount and its monetary effect.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Discount Resolution                            │
//! │                                                                     │
//! │  candidates (already filtered for applicability by the store)       │
//! │       │                                                             │
//! │       ├── free_product_id set? ──► substitution grant               │
//! │       │                            (handled by order assembly,      │
//! │       │                             excluded from the contest)      │
//! │       ▼                                                             │
//! │  compute amount per candidate                                       │
//! │    PERCENTAGE   unit_price × qty × bps / 10000                      │
//! │    FIXED        value × qty                                         │
//! │    BUY_X_GET_Y  floor(qty / (x+y)) × y × unit_price                 │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  strictly-largest amount wins; ties keep the first seen;            │
//! │  all zero ⇒ no discount                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller (order assembly in warung-db) fetches the candidate list with
//! the applicability filter (active, not deleted, inside validity window)
//! already applied; this module is pure math over that list.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, DiscountType};

/// The winning discount for one line: which discount, and how much off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDiscount {
    pub discount_id: String,
    pub amount: Money,
}

/// A product-substitution bonus triggered by a BUY_X_GET_Y discount with an
/// explicit free product reference. Order assembly turns each grant into a
/// synthetic zero-priced line item plus a discount credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeProductGrant {
    pub discount_id: String,
    pub free_product_id: String,
}

/// Computes the discount amount a single candidate yields for the line.
///
/// BUY_X_GET_Y with missing or zero `buy_x`/`get_y` computes to zero (the
/// candidate simply never wins). PERCENTAGE/FIXED with a missing value is a
/// data-integrity error, surfaced rather than defaulted.
fn candidate_amount(discount: &Discount, quantity: i64, unit_price: Money) -> CoreResult<Money> {
    match discount.discount_type {
        DiscountType::Percentage => {
            let bps = discount.value.ok_or(CoreError::DiscountConfig {
                discount_id: discount.id.clone(),
                reason: "PERCENTAGE discount has no value",
            })?;
            Ok(unit_price.multiply_quantity(quantity).percent_bps(bps as u32))
        }
        DiscountType::Fixed => {
            let per_unit = discount.value.ok_or(CoreError::DiscountConfig {
                discount_id: discount.id.clone(),
                reason: "FIXED discount has no value",
            })?;
            Ok(Money::from_cents(per_unit).multiply_quantity(quantity))
        }
        DiscountType::BuyXGetY => {
            let (buy_x, get_y) = match (discount.buy_x, discount.get_y) {
                (Some(x), Some(y)) if x > 0 && y > 0 => (x, y),
                // Misconfigured bundle ⇒ no match, not an error
                _ => return Ok(Money::zero()),
            };
            // quantity below one full set ⇒ zero sets ⇒ zero discount
            let sets = quantity / (buy_x + get_y);
            let free_items = sets * get_y;
            Ok(unit_price.multiply_quantity(free_items))
        }
    }
}

/// Resolves the best line discount among the candidates.
///
/// ## Contract (per line item)
/// - Returns `Ok(None)` when no candidate exists or all compute to zero.
/// - Strictly-largest amount wins; on a tie the first candidate seen is
///   kept, making resolution deterministic for a stable candidate order.
/// - Candidates carrying a `free_product_id` belong to the substitution
///   mode and never compete here; see [`free_product_grants`].
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use warung_core::discount::resolve_line_discount;
/// use warung_core::money::Money;
/// use warung_core::types::{Discount, DiscountType};
///
/// let ten_percent = Discount {
///     id: "d1".into(),
///     name: "10% off".into(),
///     discount_type: DiscountType::Percentage,
///     value: Some(1000),
///     buy_x: None,
///     get_y: None,
///     free_product_id: None,
///     is_active: true,
///     start_date: Utc::now(),
///     end_date: Utc::now(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
///     deleted_at: None,
/// };
///
/// let best = resolve_line_discount(&[ten_percent], 3, Money::from_cents(10_000))
///     .unwrap()
///     .unwrap();
/// assert_eq!(best.amount.cents(), 3_000);
/// ```
pub fn resolve_line_discount(
    candidates: &[Discount],
    quantity: i64,
    unit_price: Money,
) -> CoreResult<Option<ResolvedDiscount>> {
    let mut best: Option<ResolvedDiscount> = None;

    for discount in candidates {
        if discount.free_product_id.is_some() {
            continue;
        }

        let amount = candidate_amount(discount, quantity, unit_price)?;

        // Strictly larger wins; a tie keeps the earlier candidate.
        let beats_current = match &best {
            Some(current) => amount > current.amount,
            None => amount.is_positive(),
        };

        if beats_current {
            best = Some(ResolvedDiscount {
                discount_id: discount.id.clone(),
                amount,
            });
        }
    }

    Ok(best)
}

/// Returns the substitution-mode grants triggered by the candidates.
///
/// A BUY_X_GET_Y discount with `free_product_id` set grants one free unit
/// of the referenced product once the line quantity reaches `buy_x`. The
/// grant's monetary value is the free product's current price, which only
/// order assembly can look up; this function just selects the triggers.
pub fn free_product_grants(candidates: &[Discount], quantity: i64) -> Vec<FreeProductGrant> {
    candidates
        .iter()
        .filter(|d| d.discount_type == DiscountType::BuyXGetY)
        .filter_map(|d| {
            let free_product_id = d.free_product_id.clone()?;
            let buy_x = d.buy_x?;
            if buy_x > 0 && quantity >= buy_x {
                Some(FreeProductGrant {
                    discount_id: d.id.clone(),
                    free_product_id,
                })
            } else {
                None
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn base_discount(id: &str, discount_type: DiscountType) -> Discount {
        let now = Utc::now();
        Discount {
            id: id.to_string(),
            name: format!("Discount {}", id),
            discount_type,
            value: None,
            buy_x: None,
            get_y: None,
            free_product_id: None,
            is_active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn percentage(id: &str, bps: i64) -> Discount {
        let mut d = base_discount(id, DiscountType::Percentage);
        d.value = Some(bps);
        d
    }

    fn fixed(id: &str, cents: i64) -> Discount {
        let mut d = base_discount(id, DiscountType::Fixed);
        d.value = Some(cents);
        d
    }

    fn bundle(id: &str, buy_x: i64, get_y: i64) -> Discount {
        let mut d = base_discount(id, DiscountType::BuyXGetY);
        d.buy_x = Some(buy_x);
        d.get_y = Some(get_y);
        d
    }

    #[test]
    fn test_no_candidates_no_discount() {
        let best = resolve_line_discount(&[], 3, Money::from_cents(10_000)).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_percentage_discount() {
        // price 10 000, qty 3, 10% ⇒ 3 000
        let best = resolve_line_discount(&[percentage("d1", 1000)], 3, Money::from_cents(10_000))
            .unwrap()
            .unwrap();
        assert_eq!(best.discount_id, "d1");
        assert_eq!(best.amount.cents(), 3_000);
    }

    #[test]
    fn test_fixed_discount() {
        // 500 off per unit × 4 units ⇒ 2 000
        let best = resolve_line_discount(&[fixed("d1", 500)], 4, Money::from_cents(10_000))
            .unwrap()
            .unwrap();
        assert_eq!(best.amount.cents(), 2_000);
    }

    #[test]
    fn test_buy_x_get_y_full_sets() {
        // buy 2 get 1, qty 7: sets = 7/3 = 2, free = 2 ⇒ 2 × unit price
        let best = resolve_line_discount(&[bundle("d1", 2, 1)], 7, Money::from_cents(10_000))
            .unwrap()
            .unwrap();
        assert_eq!(best.amount.cents(), 20_000);
    }

    #[test]
    fn test_buy_x_get_y_below_threshold() {
        // qty 2 < buy_x + get_y = 3 ⇒ zero sets ⇒ no discount
        let best = resolve_line_discount(&[bundle("d1", 2, 1)], 2, Money::from_cents(10_000)).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_buy_x_get_y_missing_fields_is_no_match() {
        let mut d = base_discount("d1", DiscountType::BuyXGetY);
        d.buy_x = Some(2); // get_y missing
        let best = resolve_line_discount(&[d], 9, Money::from_cents(10_000)).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn test_largest_discount_wins() {
        // 10% of 30 000 = 3 000 beats fixed 500 × 3 = 1 500
        let best = resolve_line_discount(
            &[fixed("small", 500), percentage("big", 1000)],
            3,
            Money::from_cents(10_000),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.discount_id, "big");
        assert_eq!(best.amount.cents(), 3_000);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        // Both compute to 3 000; the first encountered is kept.
        let best = resolve_line_discount(
            &[percentage("first", 1000), fixed("second", 1000)],
            3,
            Money::from_cents(10_000),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.discount_id, "first");
    }

    #[test]
    fn test_percentage_without_value_is_integrity_error() {
        let d = base_discount("broken", DiscountType::Percentage);
        let err = resolve_line_discount(&[d], 3, Money::from_cents(10_000)).unwrap_err();
        assert!(matches!(err, CoreError::DiscountConfig { .. }));
    }

    #[test]
    fn test_fixed_without_value_is_integrity_error() {
        let d = base_discount("broken", DiscountType::Fixed);
        let err = resolve_line_discount(&[d], 3, Money::from_cents(10_000)).unwrap_err();
        assert!(matches!(err, CoreError::DiscountConfig { .. }));
    }

    #[test]
    fn test_substitution_candidates_do_not_compete() {
        let mut sub = bundle("sub", 2, 1);
        sub.free_product_id = Some("p-free".to_string());

        // The substitution discount would be worth 2 × unit price, but it
        // must not be picked as a line discount.
        let best = resolve_line_discount(
            &[sub, percentage("pct", 500)],
            7,
            Money::from_cents(10_000),
        )
        .unwrap()
        .unwrap();
        assert_eq!(best.discount_id, "pct");
    }

    #[test]
    fn test_free_product_grant_triggers_at_buy_x() {
        let mut sub = bundle("sub", 2, 1);
        sub.free_product_id = Some("p-free".to_string());

        let grants = free_product_grants(&[sub.clone()], 2);
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].free_product_id, "p-free");

        let grants = free_product_grants(&[sub], 1);
        assert!(grants.is_empty());
    }

    #[test]
    fn test_same_product_bundle_yields_no_grant() {
        let grants = free_product_grants(&[bundle("d1", 2, 1)], 9);
        assert!(grants.is_empty());
    }
}
