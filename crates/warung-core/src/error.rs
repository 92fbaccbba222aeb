//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Error Types                               │
//! │                                                                     │
//! │  warung-core errors (this file)                                     │
//! │  ├── CoreError        - business rule violations                    │
//! │  └── ValidationError  - malformed/missing input                     │
//! │                                                                     │
//! │  warung-db errors (separate crate)                                  │
//! │  ├── DbError          - database operation failures                 │
//! │  └── ServiceError     - Core + Db unified at the workflow boundary  │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → ServiceError → caller          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual Display impls
//! 2. Context in the message (product id, status names, amounts)
//! 3. Errors are enum variants, never bare strings
//! 4. Nothing is swallowed or retried here; callers decide

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations inside the pricing and
/// fulfillment workflow. Any of them aborts the enclosing transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product doesn't exist (or is soft-deleted).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced order doesn't exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Not enough stock to cover the requested quantity.
    ///
    /// Aborting here leaves stock untouched: the whole order either
    /// reserves every line or reserves nothing.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Illegal order status change.
    ///
    /// ## When This Occurs
    /// - Any change away from Completed or Cancelled (terminal states)
    /// - Pending → Completed without passing through Paid
    /// - Pending → Paid through the generic status update (only payment
    ///   settlement may pay an order)
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Order is in the wrong state for the requested operation
    /// (e.g. settling payment on a non-PENDING order, invoicing an
    /// unpaid order).
    #[error("Order {order_id} is {status:?}, cannot {operation}")]
    InvalidOrderStatus {
        order_id: String,
        status: OrderStatus,
        operation: &'static str,
    },

    /// Payment amount violates the method's rule.
    ///
    /// QRIS requires an exact match; cash requires at least the total.
    #[error("Payment amount {amount} does not satisfy order total {total}")]
    AmountMismatch { amount: i64, total: i64 },

    /// Discount row is missing a field its type requires.
    ///
    /// Percentage/Fixed without a value cannot be priced; surfacing the
    /// misconfiguration beats silently pricing it as zero.
    #[error("Discount {discount_id} is misconfigured: {reason}")]
    DiscountConfig {
        discount_id: String,
        reason: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before the workflow touches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
