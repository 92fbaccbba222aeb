//! # warung-core: Pure Business Logic for Warung POS
//!
//! This crate is the **heart** of Warung POS. It contains the order
//! pricing and fulfillment rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Warung POS Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │            Transport layer (HTTP — out of scope)            │    │
//! │  └────────────────────────────┬────────────────────────────────┘    │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐    │
//! │  │         warung-db: repositories + workflow services         │    │
//! │  │   create_order, settle, cancel_order, update_status, ...    │    │
//! │  └────────────────────────────┬────────────────────────────────┘    │
//! │                               │                                     │
//! │  ┌────────────────────────────▼────────────────────────────────┐    │
//! │  │              ★ warung-core (THIS CRATE) ★                   │    │
//! │  │                                                             │    │
//! │  │  ┌────────┐ ┌──────────┐ ┌─────────┐ ┌───────┐ ┌─────────┐  │    │
//! │  │  │ money  │ │ discount │ │ pricing │ │ state │ │settlemnt│  │    │
//! │  │  │ Money  │ │ resolve  │ │ totals  │ │ rules │ │ QRIS/   │  │    │
//! │  │  │ bps    │ │ grants   │ │ credits │ │       │ │ CASH    │  │    │
//! │  │  └────────┘ └──────────┘ └─────────┘ └───────┘ └─────────┘  │    │
//! │  │                                                             │    │
//! │  │      NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS     │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Discount, Order, Payment, ...)
//! - [`money`] - Integer money arithmetic (no floating point!)
//! - [`discount`] - Discount resolution engine, incl. BUY_X_GET_Y bonuses
//! - [`pricing`] - Order totals aggregation with exact tax math
//! - [`state`] - Order status transition rules
//! - [`settlement`] - Payment amount rules per method
//! - [`validation`] - Explicit input validation
//! - [`error`] - Domain error types
//!
//! ## Example
//!
//! ```rust
//! use warung_core::money::Money;
//! use warung_core::pricing::OrderPricing;
//! use warung_core::types::TaxRate;
//!
//! let mut pricing = OrderPricing::new();
//! pricing.add_line("p1", "Nasi Goreng", 3, Money::from_cents(10_000), None, None);
//!
//! let totals = pricing.totals(TaxRate::from_bps(1100)); // 11%
//! assert_eq!(totals.total.cents(), 33_300);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod settlement;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate in basis points (1100 = 11%).
///
/// A policy constant, not a law of the pricing math: the workflow takes
/// the rate as a parameter and deployments may override it.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1100;

/// Prefix for generated order numbers (`ORD-5F3A9C21`).
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Maximum quantity of a single line item.
///
/// Guards against accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
