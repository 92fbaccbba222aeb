//! # Order Repository
//!
//! Database operations for orders, their line items, and their
//! per-discount savings rows.
//!
//! ## Write Shape
//! Order creation touches four tables (orders, order_items,
//! order_discounts, products for stock) and must be all-or-nothing, so
//! every insert here takes `conn: &mut SqliteConnection` and the
//! service owns the transaction.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{Order, OrderDiscount, OrderItem, OrderStatus, Payment};

/// A fully loaded order: header plus items, discount savings, and payments.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub discounts: Vec<OrderDiscount>,
    pub payments: Vec<Payment>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Transactional inserts
    // =========================================================================

    /// Inserts an order header within a transaction.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - `order_number` collision. The caller
    ///   retries with a fresh number.
    pub async fn insert_order(&self, conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(order_number = %order.order_number, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, customer_name, table_number, order_type,
                cashier_id, status, subtotal_cents, discount_cents,
                tax_cents, total_cents, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(&order.table_number)
        .bind(order.order_type)
        .bind(&order.cashier_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.deleted_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts a line item within a transaction.
    pub async fn insert_item(&self, conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, name_snapshot, quantity,
                unit_price_cents, discount_cents, subtotal_cents,
                is_bonus, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.discount_cents)
        .bind(item.subtotal_cents)
        .bind(item.is_bonus)
        .bind(&item.notes)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts a per-discount savings row within a transaction.
    pub async fn insert_order_discount(
        &self,
        conn: &mut SqliteConnection,
        row: &OrderDiscount,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_discounts (
                id, order_id, discount_id, amount_saved_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&row.id)
        .bind(&row.order_id)
        .bind(&row.discount_id)
        .bind(row.amount_saved_cents)
        .bind(row.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Flips an order's status within a transaction, guarded by the
    /// expected current status.
    ///
    /// Returns `false` when the order's status no longer matches
    /// `expected` (a concurrent workflow committed first). The caller
    /// must treat `false` as a conflict and roll back; the flip and
    /// anything staged alongside it never land on a stale status.
    pub async fn transition_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> DbResult<bool> {
        debug!(id = %id, from = ?expected, to = ?new_status, "Transitioning order status");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(expected)
        .bind(new_status)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads an order's current status on the transaction's own
    /// connection, so services inside a transaction never touch the
    /// pool.
    pub async fn status_in_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<OrderStatus>> {
        let status = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(status)
    }

    /// Marks a cancelled order's soft-delete timestamp within a transaction.
    pub async fn mark_deleted(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order header by its ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order header by its business key (e.g. `ORD-5F3A9C21`).
    pub async fn find_by_order_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?1")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists orders, optionally filtered by status, newest first.
    /// Soft-deleted orders (cancellations) are excluded; load them by
    /// ID when a receipt for a cancelled order is needed.
    pub async fn list(&self, status: Option<OrderStatus>, limit: u32) -> DbResult<Vec<Order>> {
        let orders = match status {
            Some(status) => {
                sqlx::query_as::<_, Order>(
                    r#"
                    SELECT * FROM orders
                    WHERE status = ?1 AND deleted_at IS NULL
                    ORDER BY created_at DESC
                    LIMIT ?2
                    "#,
                )
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(
                    r#"
                    SELECT * FROM orders
                    WHERE deleted_at IS NULL
                    ORDER BY created_at DESC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    /// Lists an order's line items in insertion order.
    pub async fn items_for_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists an order's per-discount savings rows.
    pub async fn discounts_for_order(&self, order_id: &str) -> DbResult<Vec<OrderDiscount>> {
        let rows = sqlx::query_as::<_, OrderDiscount>(
            "SELECT * FROM order_discounts WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Loads the full order aggregate.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No order with this ID
    pub async fn find_detail(&self, id: &str) -> DbResult<OrderDetail> {
        let order = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let items = self.items_for_order(id).await?;
        let discounts = self.discounts_for_order(id).await?;

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetail {
            order,
            items,
            discounts,
            payments,
        })
    }

    /// Counts orders by status (for diagnostics).
    pub async fn count_by_status(&self, status: OrderStatus) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::new_id;
    use warung_core::OrderType;

    pub(crate) fn pending_order(order_number: &str) -> Order {
        let now = Utc::now();
        Order {
            id: new_id(),
            order_number: order_number.to_string(),
            customer_name: "Budi".to_string(),
            table_number: Some("4".to_string()),
            order_type: OrderType::DineIn,
            cashier_id: "cashier-1".to_string(),
            status: OrderStatus::Pending,
            subtotal_cents: 30_000,
            discount_cents: 3_000,
            tax_cents: 2_970,
            total_cents: 29_970,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = pending_order("ORD-AAAA0001");
        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(found.subtotal_cents, 30_000);
        assert_eq!(found.discount_cents, 3_000);
        assert_eq!(found.tax_cents, 2_970);
        assert_eq!(found.total_cents, 29_970);
        assert_eq!(found.status, OrderStatus::Pending);
        assert_eq!(found.order_type, OrderType::DineIn);
    }

    #[tokio::test]
    async fn test_duplicate_order_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &pending_order("ORD-SAME0001"))
            .await
            .unwrap();
        let err = repo
            .insert_order(&mut tx, &pending_order("ORD-SAME0001"))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_find_by_order_number() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = pending_order("ORD-BBBB0002");
        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();

        let found = repo
            .find_by_order_number("ORD-BBBB0002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, order.id);

        assert!(repo
            .find_by_order_number("ORD-MISSING1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_filtered_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let paid = {
            let mut o = pending_order("ORD-PAID0001");
            o.status = OrderStatus::Paid;
            o
        };

        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &pending_order("ORD-PEND0001"))
            .await
            .unwrap();
        repo.insert_order(&mut tx, &paid).await.unwrap();
        tx.commit().await.unwrap();

        let pending = repo.list(Some(OrderStatus::Pending), 50).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_number, "ORD-PEND0001");

        let all = repo.list(None, 50).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_transition_status_guard_rejects_stale_expectation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = pending_order("ORD-RACE0001");
        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();

        // A cancellation commits between another workflow's pre-read
        // (which saw PENDING) and its own transaction.
        let mut tx = db.pool().begin().await.unwrap();
        assert!(repo
            .transition_status(&mut tx, &order.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap());
        repo.mark_deleted(&mut tx, &order.id).await.unwrap();
        tx.commit().await.unwrap();

        // The stale flip to PAID must touch zero rows, so the whole
        // settlement transaction rolls back with it.
        let mut tx = db.pool().begin().await.unwrap();
        assert!(!repo
            .transition_status(&mut tx, &order.id, OrderStatus::Pending, OrderStatus::Paid)
            .await
            .unwrap());
        assert_eq!(
            repo.status_in_tx(&mut tx, &order.id).await.unwrap(),
            Some(OrderStatus::Cancelled)
        );
        drop(tx);

        let after = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(after.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_list_excludes_soft_deleted_orders() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let kept = pending_order("ORD-KEEP0001");
        let gone = pending_order("ORD-GONE0001");

        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_order(&mut tx, &kept).await.unwrap();
        repo.insert_order(&mut tx, &gone).await.unwrap();
        assert!(repo
            .transition_status(&mut tx, &gone.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap());
        repo.mark_deleted(&mut tx, &gone.id).await.unwrap();
        tx.commit().await.unwrap();

        let all = repo.list(None, 50).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].order_number, "ORD-KEEP0001");

        assert!(repo
            .list(Some(OrderStatus::Cancelled), 50)
            .await
            .unwrap()
            .is_empty());

        // Still loadable directly
        assert!(repo.find_by_id(&gone.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_detail_missing_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.orders().find_detail("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
