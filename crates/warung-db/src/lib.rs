//! # warung-db: Database Layer for Warung POS
//!
//! This crate provides database access and the atomic workflows for the
//! Warung POS backend. It uses SQLite for local storage with sqlx for
//! async operations; all business math lives in `warung-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Warung POS Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, test)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │ (order.rs,    │───►│ (product.rs,  │    │  (embedded)  │   │   │
//! │  │   │  payment.rs)  │    │  order.rs...) │    │ 001_init.sql │   │   │
//! │  │   │ transactions  │    │ SQL only      │    │              │   │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘   │   │
//! │  │           │  warung-core       │                               │   │
//! │  │           ▼  (pricing, rules)  ▼                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (warung.db, WAL mode)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order, etc.)
//! - [`service`] - Atomic workflows (order assembly, settlement)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig, OrderService, PaymentService};
//!
//! let db = Database::new(DbConfig::new("path/to/warung.db")).await?;
//!
//! let orders = OrderService::new(db.clone());
//! let detail = orders.create_order(request).await?;
//!
//! let payments = PaymentService::new(db);
//! payments.settle(&detail.order.id, PaymentMethod::Cash, 50_000, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::discount::DiscountRepository;
pub use repository::order::{OrderDetail, OrderRepository};
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;

// Service re-exports
pub use service::{
    CreateOrderRequest, Invoice, OrderItemRequest, OrderService, PaymentService, ServiceError,
    ServiceResult, SettlementReceipt,
};
