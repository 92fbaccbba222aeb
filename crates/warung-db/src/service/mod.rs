//! # Service Layer
//!
//! Workflows that span multiple repositories and must be atomic: order
//! assembly, cancellation, status changes, and payment settlement.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  warung-core       pure rules: pricing, discounts, state machine,       │
//! │                    settlement math, validation                          │
//! │        ▲                                                                │
//! │        │ called by                                                      │
//! │  service (HERE)    owns transactions, sequences repository calls,       │
//! │                    maps rule violations to rollbacks                    │
//! │        │                                                                │
//! │        ▼ calls                                                          │
//! │  repository        one table family each, SQL only                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod order;
pub mod payment;

pub use error::{ServiceError, ServiceResult};
pub use order::{CreateOrderRequest, Invoice, OrderItemRequest, OrderService};
pub use payment::{PaymentService, SettlementReceipt};
