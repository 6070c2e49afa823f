//! Database configuration module for the storefront core.
//!
//! This module handles `SQLite` connection setup and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust models.
//! The one constraint the entity derive cannot express, the composite
//! (`cart_id`, `product_id`) uniqueness on cart lines, is added as an explicit index.

use crate::entities::{CartItem, Order, OrderItem, Product, SearchTerm, cart_item};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Name of the unique index backing the add-to-cart upsert.
pub const CART_LINE_UNIQUE_INDEX: &str = "idx_cart_items_cart_product";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the directory holding a file-backed `SQLite` database, if any.
fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = Path::new(path.split('?').next().unwrap_or_default());
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    ensure_database_dir(&database_url)?;
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Unique index over (`cart_id`, `product_id`) so each product appears once per cart.
fn cart_line_unique_index() -> IndexCreateStatement {
    Index::create()
        .name(CART_LINE_UNIQUE_INDEX)
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// Creates every storefront table (if missing) plus the secondary indexes declared on
/// the entities and the composite cart-line index.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents before children so foreign keys resolve
    let tables = [
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
        schema.create_table_from_entity(SearchTerm),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    for mut index in schema.create_index_from_entity(CartItem) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }
    db.execute(builder.build(&cart_line_unique_index())).await?;

    info!("Storefront tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        cart_item::Model as CartItemModel, order::Model as OrderModel,
        order_item::Model as OrderItemModel, product::Model as ProductModel,
        search_term::Model as SearchTermModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<CartItemModel> = CartItem::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<OrderItemModel> = OrderItem::find().limit(1).all(&db).await?;
        let _: Vec<SearchTermModel> = SearchTerm::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_ensure_database_dir() -> Result<()> {
        ensure_database_dir("sqlite::memory:")?;

        let dir = std::env::temp_dir().join(format!("storefront-db-{}", std::process::id()));
        let url = format!("sqlite://{}/store.sqlite?mode=rwc", dir.display());
        ensure_database_dir(&url)?;
        assert!(dir.is_dir());

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
