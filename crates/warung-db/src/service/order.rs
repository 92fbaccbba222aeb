//! # Order Service
//!
//! Atomic order assembly, cancellation, status changes, and invoice
//! rendering.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_order                                      │
//! │                                                                         │
//! │  1. Validate input (name, items, quantities)                           │
//! │  2. Load products + discount candidates, price every line               │
//! │     (warung-core: resolve_line_discount / free_product_grants)          │
//! │  3. BEGIN                                                               │
//! │  4.   insert order header (retry order number on collision)            │
//! │  5.   guarded stock decrement per line and per bonus                   │
//! │         guard fails ──► InsufficientStock ──► ROLLBACK                 │
//! │  6.   insert items, bonus lines, per-discount savings rows             │
//! │  7. COMMIT                                                              │
//! │                                                                         │
//! │  An error anywhere between BEGIN and COMMIT drops the transaction:     │
//! │  no order rows, no stock change.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices and discounts are computed from a pre-transaction snapshot;
//! the guarded decrement inside the transaction is the stock authority,
//! so two cashiers racing for the last unit cannot both win.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::new_id;
use crate::repository::order::OrderDetail;
use crate::pool::Database;
use crate::service::error::{ServiceError, ServiceResult};
use warung_core::discount::{free_product_grants, resolve_line_discount};
use warung_core::pricing::OrderPricing;
use warung_core::state::{validate_generic_transition, validate_transition};
use warung_core::validation::{
    validate_customer_name, validate_items_not_empty, validate_quantity,
};
use warung_core::{
    CoreError, Discount, Order, OrderDiscount, OrderItem, OrderStatus, OrderType, TaxRate,
    ORDER_NUMBER_PREFIX,
};

/// One requested line in a new order.
#[derive(Debug, Clone)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub cashier_id: String,
    pub items: Vec<OrderItemRequest>,
}

/// A rendered invoice for a paid order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub order_number: String,
    pub customer_name: String,
    pub issued_at: String,
    pub items: Vec<InvoiceLine>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payments: Vec<InvoicePayment>,
    pub change_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub is_bonus: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayment {
    pub method: String,
    pub amount_cents: i64,
}

/// Service owning the order lifecycle.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    tax_rate: TaxRate,
}

impl OrderService {
    /// Creates an OrderService with the default tax rate.
    pub fn new(db: Database) -> Self {
        OrderService {
            db,
            tax_rate: TaxRate::default(),
        }
    }

    /// Creates an OrderService with an explicit tax rate.
    pub fn with_tax_rate(db: Database, tax_rate: TaxRate) -> Self {
        OrderService { db, tax_rate }
    }

    /// Creates an order: prices every line, reserves stock, and persists
    /// the whole aggregate in one transaction.
    ///
    /// ## Errors
    /// * `CoreError::Validation` - malformed input
    /// * `CoreError::ProductNotFound` - a line references a missing,
    ///   inactive, or deleted product
    /// * `CoreError::InsufficientStock` - a line (or bonus) cannot be
    ///   covered; nothing is persisted
    /// * `CoreError::DiscountConfig` - a linked discount row is broken
    pub async fn create_order(&self, request: CreateOrderRequest) -> ServiceResult<OrderDetail> {
        debug!(
            customer = %request.customer_name,
            items = request.items.len(),
            "create_order"
        );

        validate_customer_name(&request.customer_name)?;
        validate_items_not_empty(&request.items)?;
        for item in &request.items {
            validate_quantity(item.quantity)?;
        }

        let now = Utc::now();
        let products = self.db.products();
        let discounts = self.db.discounts();

        // Price every line from the current catalog snapshot.
        let mut pricing = OrderPricing::new();

        for item in &request.items {
            let product = products
                .find_sellable(&item.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

            // Early check for a friendly error before any writes; the
            // guarded decrement below remains the authority.
            if !product.has_stock_for(item.quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: item.quantity,
                }
                .into());
            }

            let candidates: Vec<Discount> = discounts
                .find_applicable_for_product(&product.id)
                .await?
                .into_iter()
                .filter(|d| d.is_applicable_at(now))
                .collect();

            let resolved =
                resolve_line_discount(&candidates, item.quantity, product.price())
                    .map_err(ServiceError::from)?;

            for grant in free_product_grants(&candidates, item.quantity) {
                let Some(free) = products.find_sellable(&grant.free_product_id).await? else {
                    warn!(
                        discount_id = %grant.discount_id,
                        free_product_id = %grant.free_product_id,
                        "Free product unavailable, skipping bonus"
                    );
                    continue;
                };
                if !free.has_stock_for(1) {
                    warn!(
                        discount_id = %grant.discount_id,
                        free_product_id = %grant.free_product_id,
                        "Free product out of stock, skipping bonus"
                    );
                    continue;
                }
                pricing.add_bonus(&grant.discount_id, &free.id, &free.name, free.price());
            }

            pricing.add_line(
                &product.id,
                &product.name,
                item.quantity,
                product.price(),
                resolved,
                item.notes.clone(),
            );
        }

        let totals = pricing.totals(self.tax_rate);

        // Everything below is one transaction.
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let orders = self.db.orders();

        let order_id = new_id();
        let mut order = Order {
            id: order_id.clone(),
            order_number: generate_order_number(),
            customer_name: request.customer_name.trim().to_string(),
            table_number: request.table_number,
            order_type: request.order_type,
            cashier_id: request.cashier_id,
            status: OrderStatus::Pending,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        // Order number is UNIQUE; a collision (vanishingly rare with 8
        // hex chars, but possible) just gets a fresh number.
        let mut attempts = 0;
        loop {
            match orders.insert_order(&mut tx, &order).await {
                Ok(()) => break,
                Err(err) if err.is_unique_violation() && attempts < 3 => {
                    attempts += 1;
                    warn!(order_number = %order.order_number, "Order number collision, regenerating");
                    order.order_number = generate_order_number();
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Reserve stock. A failed guard aborts the whole order.
        for line in pricing.lines() {
            if !products
                .decrement_stock(&mut tx, &line.product_id, line.quantity)
                .await?
            {
                let available = products
                    .stock_in_tx(&mut tx, &line.product_id)
                    .await?
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product: line.name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }
        for bonus in pricing.bonuses() {
            if !products.decrement_stock(&mut tx, &bonus.product_id, 1).await? {
                let available = products
                    .stock_in_tx(&mut tx, &bonus.product_id)
                    .await?
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    product: bonus.name.clone(),
                    available,
                    requested: 1,
                }
                .into());
            }
        }

        for line in pricing.lines() {
            let item = OrderItem {
                id: new_id(),
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                discount_cents: line.discount.cents(),
                subtotal_cents: line.subtotal().cents(),
                is_bonus: false,
                notes: line.notes.clone(),
                created_at: now,
            };
            orders.insert_item(&mut tx, &item).await?;
        }

        // Bonus lines: quantity 1, zero price, the free product's price
        // recorded as the line's saving, netting to zero.
        for bonus in pricing.bonuses() {
            let item = OrderItem {
                id: new_id(),
                order_id: order_id.clone(),
                product_id: bonus.product_id.clone(),
                name_snapshot: bonus.name.clone(),
                quantity: 1,
                unit_price_cents: 0,
                discount_cents: bonus.credit.cents(),
                subtotal_cents: 0,
                is_bonus: true,
                notes: None,
                created_at: now,
            };
            orders.insert_item(&mut tx, &item).await?;
        }

        for credit in pricing.discount_credits() {
            let row = OrderDiscount {
                id: new_id(),
                order_id: order_id.clone(),
                discount_id: credit.discount_id.clone(),
                amount_saved_cents: credit.amount_saved.cents(),
                created_at: now,
            };
            orders.insert_order_discount(&mut tx, &row).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order_id,
            order_number = %order.order_number,
            total = order.total_cents,
            items = pricing.lines().len(),
            bonuses = pricing.bonuses().len(),
            "Order created"
        );

        Ok(orders.find_detail(&order_id).await?)
    }

    /// Cancels an order, restoring stock for every line (bonus lines
    /// included, since their unit left inventory at creation).
    ///
    /// Legal from PENDING and PAID; terminal orders refuse. The status
    /// is re-read and flipped under a guard inside the transaction, so
    /// a settlement or second cancellation committing concurrently
    /// cannot double-restore stock.
    pub async fn cancel_order(&self, order_id: &str) -> ServiceResult<Order> {
        debug!(order_id = %order_id, "cancel_order");

        let orders = self.db.orders();
        let order = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        // Items are immutable after creation, safe to load up front.
        let items = orders.items_for_order(order_id).await?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let products = self.db.products();

        let current = orders
            .status_in_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        validate_transition(current, OrderStatus::Cancelled)
            .map_err(ServiceError::from)?;

        if !orders
            .transition_status(&mut tx, order_id, current, OrderStatus::Cancelled)
            .await?
        {
            return Err(CoreError::InvalidTransition {
                from: current,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        // Stock restore sits behind the guarded flip: it only commits
        // for the one cancellation that won the status.
        for item in &items {
            products
                .increment_stock(&mut tx, &item.product_id, item.quantity)
                .await?;
        }

        orders.mark_deleted(&mut tx, order_id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(order_id = %order_id, order_number = %order.order_number, "Order cancelled");

        orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }

    /// Changes an order's status through the generic transition rules.
    ///
    /// PENDING → PAID is refused here; only payment settlement pays an
    /// order. Use [`cancel_order`](Self::cancel_order) for cancellation
    /// so stock is restored.
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> ServiceResult<Order> {
        debug!(order_id = %order_id, status = ?new_status, "update_status");

        if new_status == OrderStatus::Cancelled {
            return self.cancel_order(order_id).await;
        }

        let orders = self.db.orders();

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let current = orders
            .status_in_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
        validate_generic_transition(current, new_status)
            .map_err(ServiceError::from)?;

        if !orders
            .transition_status(&mut tx, order_id, current, new_status)
            .await?
        {
            return Err(CoreError::InvalidTransition {
                from: current,
                to: new_status,
            }
            .into());
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(order_id = %order_id, status = ?new_status, "Order status updated");

        orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }

    /// Loads the full order aggregate.
    pub async fn get_order(&self, order_id: &str) -> ServiceResult<OrderDetail> {
        Ok(self.db.orders().find_detail(order_id).await?)
    }

    /// Lists orders, optionally filtered by status, newest first.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: u32,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list(status, limit).await?)
    }

    /// Renders an invoice for a PAID order.
    ///
    /// ## Errors
    /// * `CoreError::InvalidOrderStatus` - order is not PAID
    pub async fn invoice(&self, order_id: &str) -> ServiceResult<Invoice> {
        let detail = self.db.orders().find_detail(order_id).await?;

        if detail.order.status != OrderStatus::Paid {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order_id.to_string(),
                status: detail.order.status,
                operation: "generate invoice",
            }
            .into());
        }

        let change_cents: i64 = detail
            .payments
            .iter()
            .filter_map(|p| p.change_cents)
            .sum();

        Ok(Invoice {
            order_number: detail.order.order_number,
            customer_name: detail.order.customer_name,
            issued_at: detail.order.updated_at.to_rfc3339(),
            items: detail
                .items
                .into_iter()
                .map(|i| InvoiceLine {
                    name: i.name_snapshot,
                    quantity: i.quantity,
                    unit_price_cents: i.unit_price_cents,
                    line_total_cents: i.subtotal_cents,
                    is_bonus: i.is_bonus,
                })
                .collect(),
            subtotal_cents: detail.order.subtotal_cents,
            discount_cents: detail.order.discount_cents,
            tax_cents: detail.order.tax_cents,
            total_cents: detail.order.total_cents,
            payments: detail
                .payments
                .into_iter()
                .map(|p| InvoicePayment {
                    method: format!("{:?}", p.method).to_uppercase(),
                    amount_cents: p.amount_cents,
                })
                .collect(),
            change_cents,
        })
    }
}

/// Generates an order number: `ORD-` plus 8 uppercase hex characters.
fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}{}", ORDER_NUMBER_PREFIX, id[..8].to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================
