//! # Payment Service
//!
//! Settlement of a PENDING order by a single full payment.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       settle                                            │
//! │                                                                         │
//! │  1. Load order; must be PENDING                                         │
//! │  2. validate_settlement (warung-core)                                   │
//! │       QRIS  amount == total        exact, change None                  │
//! │       CASH  amount >= total        change = amount − total             │
//! │  3. BEGIN                                                               │
//! │  4.   insert payment (status PAID)                                      │
//! │  5.   order status PENDING → PAID, guarded on PENDING                   │
//! │         guard misses ──► conflict ──► ROLLBACK                         │
//! │  6. COMMIT                                                              │
//! │                                                                         │
//! │  The payment row and the status flip land together or not at all:     │
//! │  no paid order without its payment, no orphan payment, and a          │
//! │  concurrently cancelled (or already settled) order stays that way.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::new_id;
use crate::service::error::ServiceResult;
use warung_core::settlement::validate_settlement;
use warung_core::validation::validate_payment_amount;
use warung_core::{
    CoreError, Money, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus,
};

/// Outcome of a successful settlement.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub payment: Payment,
    pub order: Order,
}

/// Service owning payment settlement.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    /// Creates a PaymentService.
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Settles a PENDING order with one payment.
    ///
    /// ## Errors
    /// * `CoreError::OrderNotFound` - no such order
    /// * `CoreError::InvalidOrderStatus` - order is not PENDING
    /// * `CoreError::AmountMismatch` - amount violates the method's rule
    pub async fn settle(
        &self,
        order_id: &str,
        method: PaymentMethod,
        amount_cents: i64,
        transaction_id: Option<String>,
    ) -> ServiceResult<SettlementReceipt> {
        debug!(order_id = %order_id, method = ?method, amount = amount_cents, "settle");

        validate_payment_amount(amount_cents)?;

        let orders = self.db.orders();
        let order = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order_id.to_string(),
                status: order.status,
                operation: "settle payment",
            }
            .into());
        }

        let outcome = validate_settlement(
            method,
            Money::from_cents(amount_cents),
            order.total_amount(),
        )?;

        let payment = Payment {
            id: new_id(),
            order_id: order_id.to_string(),
            method,
            amount_cents,
            change_cents: outcome.change.map(|c| c.cents()),
            transaction_id,
            status: PaymentStatus::Paid,
            created_at: Utc::now(),
        };

        // The pre-read above gives a friendly early error; the guarded
        // flip inside the transaction is the authority. If a concurrent
        // cancellation (or second settlement) committed in between, the
        // guard misses and the payment row rolls back with it.
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        self.db.payments().insert(&mut tx, &payment).await?;
        if !orders
            .transition_status(&mut tx, order_id, OrderStatus::Pending, OrderStatus::Paid)
            .await?
        {
            let status = orders
                .status_in_tx(&mut tx, order_id)
                .await?
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
            return Err(CoreError::InvalidOrderStatus {
                order_id: order_id.to_string(),
                status,
                operation: "settle payment",
            }
            .into());
        }
        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order_id,
            payment_id = %payment.id,
            amount = amount_cents,
            change = ?payment.change_cents,
            "Order settled"
        );

        let order = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        Ok(SettlementReceipt { payment, order })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::service::error::ServiceError;
    use crate::service::order::{CreateOrderRequest, OrderItemRequest, OrderService};
    use warung_core::{OrderType, Product};

    async fn seed_order(db: &Database, price_cents: i64, quantity: i64) -> Order {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            category_id: None,
            name: "Nasi Goreng".to_string(),
            price_cents,
            stock: 100,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        db.products().insert(&product).await.unwrap();

        let detail = OrderService::new(db.clone())
            .create_order(CreateOrderRequest {
                customer_name: "Sari".to_string(),
                table_number: None,
                order_type: OrderType::TakeAway,
                cashier_id: "cashier-1".to_string(),
                items: vec![OrderItemRequest {
                    product_id: product.id.clone(),
                    quantity,
                    notes: None,
                }],
            })
            .await
            .unwrap();

        detail.order
    }

    #[tokio::test]
    async fn test_qris_exact_settlement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        let receipt = PaymentService::new(db.clone())
            .settle(
                &order.id,
                PaymentMethod::Qris,
                order.total_cents,
                Some("QR-12345".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(receipt.order.status, OrderStatus::Paid);
        assert_eq!(receipt.payment.status, PaymentStatus::Paid);
        assert_eq!(receipt.payment.change_cents, None);
        assert_eq!(receipt.payment.transaction_id.as_deref(), Some("QR-12345"));
    }

    #[tokio::test]
    async fn test_qris_mismatch_rejected_atomically() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        let err = PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Qris, order.total_cents + 1, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::AmountMismatch { .. })
        ));

        // Order untouched and no payment row
        let after = db.orders().find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(after.status, OrderStatus::Pending);
        assert!(db.payments().list_for_order(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cash_overpayment_returns_change() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        let receipt = PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Cash, order.total_cents + 5_000, None)
            .await
            .unwrap();

        assert_eq!(receipt.payment.change_cents, Some(5_000));
        assert_eq!(receipt.order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_cash_exact_returns_zero_change() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 1).await;

        let receipt = PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Cash, order.total_cents, None)
            .await
            .unwrap();

        assert_eq!(receipt.payment.change_cents, Some(0));
    }

    #[tokio::test]
    async fn test_cash_underpayment_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        let err = PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Cash, order.total_cents - 1, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::AmountMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_settling_paid_order_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 1).await;

        let service = PaymentService::new(db.clone());
        service
            .settle(&order.id, PaymentMethod::Cash, order.total_cents, None)
            .await
            .unwrap();

        let err = service
            .settle(&order.id, PaymentMethod::Cash, order.total_cents, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_settling_cancelled_order_rejected_without_payment_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        OrderService::new(db.clone())
            .cancel_order(&order.id)
            .await
            .unwrap();

        let err = PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Cash, order.total_cents, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidOrderStatus {
                status: OrderStatus::Cancelled,
                ..
            })
        ));
        assert!(db.payments().list_for_order(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_settlement_rolls_back_after_concurrent_cancel() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 2).await;

        // A settlement's pre-read sees PENDING...
        let stale = db.orders().find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stale.status, OrderStatus::Pending);

        // ...then a cancellation commits (restoring stock) before the
        // settlement transaction runs.
        OrderService::new(db.clone())
            .cancel_order(&order.id)
            .await
            .unwrap();

        // The settlement transaction body: payment insert plus the
        // guarded flip keyed to the stale PENDING read.
        let payment = Payment {
            id: new_id(),
            order_id: order.id.clone(),
            method: PaymentMethod::Cash,
            amount_cents: stale.total_cents,
            change_cents: Some(0),
            transaction_id: None,
            status: PaymentStatus::Paid,
            created_at: Utc::now(),
        };
        let mut tx = db.pool().begin().await.unwrap();
        db.payments().insert(&mut tx, &payment).await.unwrap();
        let flipped = db
            .orders()
            .transition_status(&mut tx, &order.id, OrderStatus::Pending, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(!flipped);
        drop(tx);

        // The cancelled order stays cancelled, with no payment row and
        // its restored stock untouched.
        let after = db.orders().find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(after.status, OrderStatus::Cancelled);
        assert!(after.deleted_at.is_some());
        assert!(db.payments().list_for_order(&order.id).await.unwrap().is_empty());

        let items = db.orders().items_for_order(&order.id).await.unwrap();
        let product = db
            .products()
            .find_by_id(&items[0].product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.stock, 100);
    }

    #[tokio::test]
    async fn test_settlement_enables_invoice_and_completion() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 1).await;

        PaymentService::new(db.clone())
            .settle(&order.id, PaymentMethod::Qris, order.total_cents, None)
            .await
            .unwrap();

        let order_service = OrderService::new(db.clone());
        let invoice = order_service.invoice(&order.id).await.unwrap();
        assert_eq!(invoice.total_cents, order.total_cents);
        assert_eq!(invoice.payments.len(), 1);
        assert_eq!(invoice.payments[0].method, "QRIS");

        let completed = order_service
            .update_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_nonpositive_amount_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db, 10_000, 1).await;

        let err = PaymentService::new(db)
            .settle(&order.id, PaymentMethod::Cash, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Validation(_))
        ));
    }
}
