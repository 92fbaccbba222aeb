//! # Payment Settlement Rules
//!
//! Method-specific validation of a payment amount against an order total.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  QRIS   amount == total       exactly, or AmountMismatch            │
//! │  CASH   amount >= total       change = amount − total (≥ 0)         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The surrounding transaction (PaymentService in warung-db) checks the
//! order's PENDING status and records the payment; this module decides
//! only whether the tendered amount satisfies the method's rule.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

/// Outcome of a successful settlement validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Change due back to the customer. `None` for exact-payment methods,
    /// `Some(amount − total)` for cash.
    pub change: Option<Money>,
}

/// Validates `amount` against `total` under the method's rule.
pub fn validate_settlement(
    method: PaymentMethod,
    amount: Money,
    total: Money,
) -> CoreResult<SettlementOutcome> {
    match method {
        PaymentMethod::Qris => {
            if amount != total {
                return Err(CoreError::AmountMismatch {
                    amount: amount.cents(),
                    total: total.cents(),
                });
            }
            Ok(SettlementOutcome { change: None })
        }
        PaymentMethod::Cash => {
            if amount < total {
                return Err(CoreError::AmountMismatch {
                    amount: amount.cents(),
                    total: total.cents(),
                });
            }
            Ok(SettlementOutcome {
                change: Some(amount - total),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
