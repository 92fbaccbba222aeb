//! # Repository Layer
//!
//! One repository per aggregate, each a thin struct around the shared
//! `SqlitePool`.
//!
//! ## Transaction Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Read methods        take &self and use the pool directly              │
//! │  Write methods that                                                     │
//! │  must be atomic      take `conn: &mut SqliteConnection`                 │
//! │                                                                         │
//! │  Services own the transaction:                                          │
//! │      let mut tx = db.pool().begin().await?;                             │
//! │      repo.insert_order(&mut *tx, &order).await?;                        │
//! │      repo.insert_item(&mut *tx, &item).await?;                          │
//! │      tx.commit().await?;                                                │
//! │                                                                         │
//! │  A `?` before commit drops the transaction and rolls everything back.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod category;
pub mod discount;
pub mod order;
pub mod payment;
pub mod product;

use uuid::Uuid;

/// Generates a fresh UUID v4 row ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
