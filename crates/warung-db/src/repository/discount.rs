//! # Discount Repository
//!
//! Database operations for discounts and their product links.
//!
//! ## Candidate Lookup
//! `find_applicable_for_product` joins through `product_discounts` and
//! filters on active/non-deleted in SQL; the validity window is checked
//! in the pricing engine against the order timestamp so the same query
//! serves any clock.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::Discount;

/// Repository for discount database operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Inserts a new discount.
    pub async fn insert(&self, discount: &Discount) -> DbResult<()> {
        debug!(name = %discount.name, "Inserting discount");

        sqlx::query(
            r#"
            INSERT INTO discounts (
                id, name, discount_type, value, buy_x, get_y, free_product_id,
                is_active, start_date, end_date, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.name)
        .bind(discount.discount_type)
        .bind(discount.value)
        .bind(discount.buy_x)
        .bind(discount.get_y)
        .bind(&discount.free_product_id)
        .bind(discount.is_active)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .bind(discount.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a discount by its ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(discount)
    }

    /// Lists non-deleted discounts.
    pub async fn list(&self) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            "SELECT * FROM discounts WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Updates a discount's configuration.
    pub async fn update(&self, discount: &Discount) -> DbResult<()> {
        debug!(id = %discount.id, "Updating discount");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE discounts SET
                name = ?2,
                discount_type = ?3,
                value = ?4,
                buy_x = ?5,
                get_y = ?6,
                free_product_id = ?7,
                is_active = ?8,
                start_date = ?9,
                end_date = ?10,
                updated_at = ?11
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.name)
        .bind(discount.discount_type)
        .bind(discount.value)
        .bind(discount.buy_x)
        .bind(discount.get_y)
        .bind(&discount.free_product_id)
        .bind(discount.is_active)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", &discount.id));
        }

        Ok(())
    }

    /// Soft-deletes a discount.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting discount");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE discounts
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        Ok(())
    }

    /// Links a discount to a product it applies to.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - Link already exists
    /// * `DbError::ForeignKeyViolation` - Product or discount missing
    pub async fn link_product(&self, product_id: &str, discount_id: &str) -> DbResult<()> {
        debug!(product_id = %product_id, discount_id = %discount_id, "Linking discount");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO product_discounts (product_id, discount_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(product_id)
        .bind(discount_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a discount-product link.
    pub async fn unlink_product(&self, product_id: &str, discount_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM product_discounts WHERE product_id = ?1 AND discount_id = ?2",
        )
        .bind(product_id)
        .bind(discount_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductDiscount", product_id));
        }

        Ok(())
    }

    /// Finds active, non-deleted discounts linked to a product.
    ///
    /// The validity window is deliberately NOT filtered here; callers
    /// check `is_applicable_at` against the pricing timestamp.
    pub async fn find_applicable_for_product(&self, product_id: &str) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            r#"
            SELECT d.*
            FROM discounts d
            INNER JOIN product_discounts pd ON pd.discount_id = d.id
            WHERE pd.product_id = ?1
              AND d.is_active = 1
              AND d.deleted_at IS NULL
            ORDER BY d.created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
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
    use chrono::Duration;
    use warung_core::{DiscountType, Product};

    fn product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: new_id(),
            category_id: None,
            name: name.to_string(),
            price_cents: 10_000,
            stock: 50,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn percentage_discount(name: &str, bps: i64) -> Discount {
        let now = Utc::now();
        Discount {
            id: new_id(),
            name: name.to_string(),
            discount_type: DiscountType::Percentage,
            value: Some(bps),
            buy_x: None,
            get_y: None,
            free_product_id: None,
            is_active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_link_and_find_applicable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = product("Es Teh");
        db.products().insert(&p).await.unwrap();

        let d = percentage_discount("10% off", 1000);
        let repo = db.discounts();
        repo.insert(&d).await.unwrap();
        repo.link_product(&p.id, &d.id).await.unwrap();

        let candidates = repo.find_applicable_for_product(&p.id).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, d.id);
    }

    #[tokio::test]
    async fn test_inactive_discount_excluded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = product("Kopi");
        db.products().insert(&p).await.unwrap();

        let mut d = percentage_discount("Off promo", 500);
        d.is_active = false;
        let repo = db.discounts();
        repo.insert(&d).await.unwrap();
        repo.link_product(&p.id, &d.id).await.unwrap();

        assert!(repo
            .find_applicable_for_product(&p.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_discount_excluded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = product("Bakso");
        db.products().insert(&p).await.unwrap();

        let d = percentage_discount("Expired promo", 500);
        let repo = db.discounts();
        repo.insert(&d).await.unwrap();
        repo.link_product(&p.id, &d.id).await.unwrap();
        repo.soft_delete(&d.id).await.unwrap();

        assert!(repo
            .find_applicable_for_product(&p.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = product("Sate");
        db.products().insert(&p).await.unwrap();

        let d = percentage_discount("Promo", 1000);
        let repo = db.discounts();
        repo.insert(&d).await.unwrap();
        repo.link_product(&p.id, &d.id).await.unwrap();

        let err = repo.link_product(&p.id, &d.id).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_discount_roundtrip_preserves_type() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.discounts();

        let now = Utc::now();
        let d = Discount {
            id: new_id(),
            name: "Buy 2 Get 1".to_string(),
            discount_type: DiscountType::BuyXGetY,
            value: None,
            buy_x: Some(2),
            get_y: Some(1),
            free_product_id: None,
            is_active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        repo.insert(&d).await.unwrap();

        let found = repo.find_by_id(&d.id).await.unwrap().unwrap();
        assert_eq!(found.discount_type, DiscountType::BuyXGetY);
        assert_eq!(found.buy_x, Some(2));
        assert_eq!(found.get_y, Some(1));
    }
}
