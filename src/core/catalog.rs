//! Product catalog operations.
//!
//! The cart and checkout only read from the catalog: lookups by slug and id and the
//! live `price`. Creation, price updates and config seeding exist so the catalog can
//! be populated by the operator binary and by tests.

use crate::{
    config::settings::ProductConfig,
    entities::{Product, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Finds a product by its unique slug.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if no product carries `slug`.
pub async fn get_product_by_slug<C>(db: &C, slug: &str) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            slug: slug.to_string(),
        })
}

/// Retrieves a product by id, returning `None` if it does not exist.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All products, ordered alphabetically by name.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() {
        return Err(Error::validation("price", format!("cannot be negative, got {price}")));
    }
    if price != price.round_dp(2) {
        return Err(Error::validation(
            "price",
            format!("at most two decimal places allowed, got {price}"),
        ));
    }
    Ok(price.round_dp(2))
}

/// Creates a new product after validating its fields.
///
/// # Errors
/// Returns an error if:
/// - the name, slug or sku is empty or whitespace-only
/// - the price is negative or has more than two decimal places
/// - the insert fails (e.g. duplicate slug)
pub async fn create_product<C>(
    db: &C,
    name: &str,
    slug: &str,
    sku: &str,
    price: Decimal,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    for (field, value) in [("name", name), ("slug", slug), ("sku", sku)] {
        if value.trim().is_empty() {
            return Err(Error::validation(field, "cannot be empty"));
        }
    }
    let price = validate_price(price)?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        slug: Set(slug.trim().to_string()),
        sku: Set(sku.trim().to_string()),
        price: Set(price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let product = product.insert(db).await?;
    debug!("Created product {} ({}) at {}", product.slug, product.sku, product.price);
    Ok(product)
}

/// Changes the live price of a product. Existing order lines are unaffected.
///
/// # Errors
/// Returns an error if the price is invalid or the product does not exist.
pub async fn update_product_price<C>(db: &C, slug: &str, new_price: Decimal) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let new_price = validate_price(new_price)?;
    let mut product: product::ActiveModel = get_product_by_slug(db, slug).await?.into();

    product.price = Set(new_price);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Inserts every configured product whose slug is not yet in the catalog.
///
/// Existing products are left untouched so a re-run never rewrites live prices.
/// Returns the number of products inserted.
pub async fn seed_products(db: &DatabaseConnection, products: &[ProductConfig]) -> Result<usize> {
    let mut inserted = 0;
    for config in products {
        match get_product_by_slug(db, &config.slug).await {
            Ok(_) => debug!("Product {} already present, skipping", config.slug),
            Err(Error::ProductNotFound { .. }) => {
                create_product(db, &config.name, &config.slug, &config.sku, config.price).await?;
                inserted += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!("Seeded {} of {} configured products.", inserted, products.len());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(&db, "", "ring", "R1", Decimal::ONE).await;
        assert!(matches!(result, Err(Error::Validation { field: "name", .. })));

        let result = create_product(&db, "Ring", "   ", "R1", Decimal::ONE).await;
        assert!(matches!(result, Err(Error::Validation { field: "slug", .. })));

        let result = create_product(&db, "Ring", "ring", "R1", Decimal::new(-100, 2)).await;
        assert!(matches!(result, Err(Error::Validation { field: "price", .. })));

        let result = create_product(&db, "Ring", "ring", "R1", Decimal::new(1999, 3)).await;
        assert!(matches!(result, Err(Error::Validation { field: "price", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_find_by_slug() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_product(&db, " Ruby Ring ", "ruby-ring", "RR-1", Decimal::new(999, 2)).await?;
        assert_eq!(created.name, "Ruby Ring");
        assert_eq!(created.absolute_url(), "/product/ruby-ring/");

        let found = get_product_by_slug(&db, "ruby-ring").await?;
        assert_eq!(found.id, created.id);
        assert_eq!(found.price, Decimal::new(999, 2));

        let by_id = get_product_by_id(&db, created.id).await?;
        assert_eq!(by_id.map(|p| p.slug), Some("ruby-ring".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_by_slug_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = get_product_by_slug(&db, "missing").await;
        assert!(matches!(result, Err(Error::ProductNotFound { slug }) if slug == "missing"));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_product(&db, "ring", Decimal::ONE).await?;
        let result = create_product(&db, "Other", "ring", "X", Decimal::ONE).await;
        assert!(matches!(result, Err(Error::Database(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_price() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_product(&db, "ring", Decimal::new(1000, 2)).await?;
        let updated = update_product_price(&db, "ring", Decimal::new(2000, 2)).await?;
        assert_eq!(updated.price, Decimal::new(2000, 2));

        let reloaded = get_product_by_slug(&db, "ring").await?;
        assert_eq!(reloaded.price, Decimal::new(2000, 2));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_products_skips_existing() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "ruby-ring", Decimal::new(1500, 2)).await?;

        let configured = vec![
            ProductConfig {
                name: "Ruby Ring".to_string(),
                slug: "ruby-ring".to_string(),
                sku: "RR-1".to_string(),
                price: Decimal::new(999, 2),
            },
            ProductConfig {
                name: "Gold Chain".to_string(),
                slug: "gold-chain".to_string(),
                sku: "GC-1".to_string(),
                price: Decimal::new(500, 2),
            },
        ];

        assert_eq!(seed_products(&db, &configured).await?, 1);
        assert_eq!(seed_products(&db, &configured).await?, 0);

        let products = list_products(&db).await?;
        assert_eq!(products.len(), 2);
        // Existing price is not overwritten by the seed
        let ruby = get_product_by_slug(&db, "ruby-ring").await?;
        assert_eq!(ruby.price, Decimal::new(1500, 2));

        Ok(())
    }
}
