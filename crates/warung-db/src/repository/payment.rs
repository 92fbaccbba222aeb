//! # Payment Repository
//!
//! Database operations for payments. Inserts are transactional because
//! settlement writes the payment and flips the order status together.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::Payment;

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment within a transaction.
    pub async fn insert(&self, conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
        debug!(order_id = %payment.order_id, method = ?payment.method, "Inserting payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, method, amount_cents, change_cents,
                transaction_id, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(payment.change_cents)
        .bind(&payment.transaction_id)
        .bind(payment.status)
        .bind(payment.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a payment by its ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", id))?;

        Ok(payment)
    }

    /// Lists payments made against an order, oldest first.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
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
    use chrono::Utc;
    use warung_core::{Order, OrderStatus, OrderType, PaymentMethod, PaymentStatus};

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: new_id(),
            order_number: format!("ORD-{}", &new_id()[..8]),
            customer_name: "Sari".to_string(),
            table_number: None,
            order_type: OrderType::TakeAway,
            cashier_id: "cashier-1".to_string(),
            status: OrderStatus::Pending,
            subtotal_cents: 20_000,
            discount_cents: 0,
            tax_cents: 2_200,
            total_cents: 22_200,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_for_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let o = order();
        let payment = Payment {
            id: new_id(),
            order_id: o.id.clone(),
            method: PaymentMethod::Cash,
            amount_cents: 25_000,
            change_cents: Some(2_800),
            transaction_id: None,
            status: PaymentStatus::Paid,
            created_at: Utc::now(),
        };

        let mut tx = db.pool().begin().await.unwrap();
        db.orders().insert_order(&mut tx, &o).await.unwrap();
        db.payments().insert(&mut tx, &payment).await.unwrap();
        tx.commit().await.unwrap();

        let payments = db.payments().list_for_order(&o.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].method, PaymentMethod::Cash);
        assert_eq!(payments[0].change_cents, Some(2_800));
        assert_eq!(payments[0].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_find_missing_payment() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.payments().find_by_id("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
