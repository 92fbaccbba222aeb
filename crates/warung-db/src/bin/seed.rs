//! # Seed Binary
//!
//! Populates a database with a demo catalog: categories, products, and
//! the three discount shapes, including a substitution-mode bundle.
//!
//! ## Usage
//! ```text
//! seed [path/to/warung.db]        defaults to ./warung.db
//! RUST_LOG=debug seed             verbose logging
//! ```

use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use warung_core::{Discount, DiscountType, Product, ProductCategory};
use warung_db::repository::new_id;
use warung_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "warung.db".to_string());

    info!(path = %path, "Seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;

    let now = Utc::now();

    // Categories
    let mains = ProductCategory {
        id: new_id(),
        name: "Mains".to_string(),
        description: Some("Rice and noodle dishes".to_string()),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    let drinks = ProductCategory {
        id: new_id(),
        name: "Drinks".to_string(),
        description: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    db.categories().insert(&mains).await?;
    db.categories().insert(&drinks).await?;

    // Products
    let product = |category_id: &str, name: &str, price_cents: i64, stock: i64| Product {
        id: new_id(),
        category_id: Some(category_id.to_string()),
        name: name.to_string(),
        price_cents,
        stock,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    let nasi_goreng = product(&mains.id, "Nasi Goreng", 25_000, 50);
    let mie_goreng = product(&mains.id, "Mie Goreng", 22_000, 50);
    let sate_ayam = product(&mains.id, "Sate Ayam", 30_000, 30);
    let es_teh = product(&drinks.id, "Es Teh", 5_000, 200);
    let kopi = product(&drinks.id, "Kopi Tubruk", 8_000, 100);
    let kerupuk = product(&mains.id, "Kerupuk", 3_000, 80);

    for p in [
        &nasi_goreng,
        &mie_goreng,
        &sate_ayam,
        &es_teh,
        &kopi,
        &kerupuk,
    ] {
        db.products().insert(p).await?;
    }

    // Discounts: one of each shape
    let discount =
        |name: &str, discount_type: DiscountType| Discount {
            id: new_id(),
            name: name.to_string(),
            discount_type,
            value: None,
            buy_x: None,
            get_y: None,
            free_product_id: None,
            is_active: true,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

    // 10% off Nasi Goreng
    let mut ten_percent = discount("10% off Nasi Goreng", DiscountType::Percentage);
    ten_percent.value = Some(1000);
    db.discounts().insert(&ten_percent).await?;
    db.discounts()
        .link_product(&nasi_goreng.id, &ten_percent.id)
        .await?;

    // 1 000 off per Es Teh
    let mut fixed = discount("Es Teh promo", DiscountType::Fixed);
    fixed.value = Some(1_000);
    db.discounts().insert(&fixed).await?;
    db.discounts().link_product(&es_teh.id, &fixed.id).await?;

    // Buy 2 Sate Ayam, get 1 free (same product)
    let mut bundle = discount("Sate bundle", DiscountType::BuyXGetY);
    bundle.buy_x = Some(2);
    bundle.get_y = Some(1);
    db.discounts().insert(&bundle).await?;
    db.discounts()
        .link_product(&sate_ayam.id, &bundle.id)
        .await?;

    // Buy 2 Mie Goreng, get a free Kerupuk (substitution mode)
    let mut free_kerupuk = discount("Free kerupuk with mie", DiscountType::BuyXGetY);
    free_kerupuk.buy_x = Some(2);
    free_kerupuk.get_y = Some(1);
    free_kerupuk.free_product_id = Some(kerupuk.id.clone());
    db.discounts().insert(&free_kerupuk).await?;
    db.discounts()
        .link_product(&mie_goreng.id, &free_kerupuk.id)
        .await?;

    let products = db.products().count().await?;
    info!(products, "Seed complete");

    db.close().await;
    Ok(())
}
