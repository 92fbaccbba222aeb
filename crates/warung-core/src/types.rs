//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Domain Types                              │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │    Product    │   │     Order     │   │    Payment    │          │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │          │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ id (UUID)     │          │
//! │  │ price_cents   │   │ order_number  │   │ order_id (FK) │          │
//! │  │ stock         │   │ status        │   │ method        │          │
//! │  │ is_active     │   │ 4 totals      │   │ change_cents  │          │
//! │  └───────┬───────┘   └───────┬───────┘   └───────────────┘          │
//! │          │                   │                                      │
//! │  ┌───────┴───────┐   ┌───────┴───────┐   ┌───────────────┐          │
//! │  │   Discount    │   │   OrderItem   │   │ OrderDiscount │          │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │          │
//! │  │ type          │   │ price frozen  │   │ amount_saved  │          │
//! │  │ validity      │   │ is_bonus      │   │ per discount  │          │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `order_number`: human-readable business key, UNIQUE in the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 1100 bps = 11% (the default VAT applied at checkout).
/// Keeping the rate integral keeps the whole tax computation integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
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
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Catalog: Category & Product
// =============================================================================

/// A product category (Beverages, Snacks, Mains, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; a non-null value means the category is retired.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Category this product belongs to, if any.
    pub category_id: Option<String>,

    /// Display name shown to cashier and on the invoice.
    pub name: String,

    /// Unit price in cents. Never negative.
    pub price_cents: i64,

    /// Current stock level. The store enforces `stock >= 0`.
    pub stock: i64,

    /// Whether the product is sellable.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. Deleted products stay referencable from
    /// historical order items.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity can be sold from stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// The kind of price reduction a discount applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage off the line total. `value` holds basis points.
    Percentage,
    /// Fixed amount off per unit. `value` holds cents.
    Fixed,
    /// Buy X, get Y free. Uses `buy_x`/`get_y`, and optionally
    /// `free_product_id` for a product-substitution bonus.
    BuyXGetY,
}

/// A discount definition.
///
/// ## Value Encoding
/// The single `value` column is interpreted by `discount_type`:
/// - `Percentage`: basis points (1000 = 10%)
/// - `Fixed`: cents off per unit
/// - `BuyXGetY`: unused (`buy_x`/`get_y` drive the math)
///
/// ## Precondition
/// A `Percentage` or `Fixed` discount with `value = None` is misconfigured
/// data; the resolution engine surfaces it as a data-integrity error rather
/// than inventing a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    pub id: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: Option<i64>,
    pub buy_x: Option<i64>,
    pub get_y: Option<i64>,
    /// When set on a BuyXGetY discount, the bonus is a free unit of this
    /// referenced product instead of a same-product price credit.
    pub free_product_id: Option<String>,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Discount {
    /// Checks applicability: active, not soft-deleted, and `at` inside
    /// the validity window.
    pub fn is_applicable_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active && self.deleted_at.is_none() && self.start_date <= at && at <= self.end_date
    }
}

/// Association row linking a discount to a product it applies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductDiscount {
    pub product_id: String,
    pub discount_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// The lifecycle status of an order.
///
/// Transition rules live in [`crate::state`]; this enum is just the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, priced, awaiting payment.
    Pending,
    /// Fully settled by a payment.
    Paid,
    /// Served/fulfilled. Terminal.
    Completed,
    /// Cancelled, stock restored. Terminal.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// How the order is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    TakeAway,
}

/// An order: one checkout, priced exactly once at creation.
///
/// ## Totals Invariant
/// `total_cents == subtotal_cents - discount_cents + tax_cents`, always.
/// The four totals are computed by the pricing workflow and never
/// recomputed on read; reads return what was persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Business key, e.g. `ORD-5F3A9C21`. UNIQUE in the store.
    pub order_number: String,
    pub customer_name: String,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub cashier_id: String,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the order is cancelled.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
///
/// Uses the snapshot pattern: product name and unit price are frozen at
/// order time so later catalog edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at order time (frozen).
    pub name_snapshot: String,
    /// Quantity ordered. Always > 0 (a bonus line has quantity 1).
    pub quantity: i64,
    /// Unit price in cents at order time (frozen). Zero for bonus lines.
    pub unit_price_cents: i64,
    /// Discount applied to this line.
    pub discount_cents: i64,
    /// `unit_price × quantity − discount`, except bonus lines where the
    /// whole line nets to zero.
    pub subtotal_cents: i64,
    /// True for a synthetic free line granted by a BUY_X_GET_Y discount.
    pub is_bonus: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// Per-discount savings on an order, aggregated across its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderDiscount {
    pub id: String,
    pub order_id: String,
    pub discount_id: String,
    pub amount_saved_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payments
// =============================================================================

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Physical cash. May overpay; change is returned.
    Cash,
    /// QR-code transfer. Must match the order total exactly.
    Qris,
}

/// Status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// A payment towards an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    /// Amount tendered in cents.
    pub amount_cents: i64,
    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,
    /// External reference (QRIS transaction id, etc.).
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
