//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        cart_id::CartId,
        catalog,
        checkout::{Address, ContactInfo, NewOrder},
    },
    entities::{self, CartItem},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::net::{IpAddr, Ipv4Addr};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * name: the slug with dashes replaced by spaces
/// * sku: `"SKU-{slug}"`
pub async fn create_test_product(
    db: &DatabaseConnection,
    slug: &str,
    price: Decimal,
) -> Result<entities::product::Model> {
    catalog::create_product(db, &slug.replace('-', " "), slug, &format!("SKU-{slug}"), price).await
}

/// A fixed cart id for tests.
pub fn test_cart_id(token: &str) -> CartId {
    CartId::new(token)
}

/// Moves a cart line's `added_at` back by `days` days.
pub async fn backdate_cart_item(db: &DatabaseConnection, item_id: i64, days: i64) -> Result<()> {
    let item = CartItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::CartItemNotFound { item_id })?;

    let mut item: entities::cart_item::ActiveModel = item.into();
    item.added_at = Set(Utc::now() - Duration::days(days));
    item.update(db).await?;
    Ok(())
}

fn test_address(name: &str) -> Address {
    Address {
        name: name.to_string(),
        address_1: "1 Main Street".to_string(),
        address_2: "Apt 2".to_string(),
        city: "Austin".to_string(),
        state: "TX".to_string(),
        country: "United States".to_string(),
        zip: "78701".to_string(),
    }
}

/// Order details that pass validation.
///
/// # Defaults
/// * `ip_address`: 127.0.0.1
/// * `transaction_id`: `"TXN-0001"`
/// * `user_id`: None (anonymous checkout)
pub fn test_new_order() -> NewOrder {
    NewOrder {
        contact: ContactInfo {
            email: "buyer@example.com".to_string(),
            phone: "555-0100".to_string(),
        },
        shipping: test_address("Test Buyer"),
        billing: test_address("Test Payer"),
        ip_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        transaction_id: "TXN-0001".to_string(),
        user_id: None,
    }
}
