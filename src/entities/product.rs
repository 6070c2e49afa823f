//! Product entity - The priced catalog records that carts and orders reference.
//!
//! The catalog is read-only from the cart's point of view: carts look products up
//! by `slug` and read the live `price`, orders copy the price at checkout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Ruby Ring")
    pub name: String,
    /// URL-safe unique key used by add-to-cart requests
    #[sea_orm(unique)]
    pub slug: String,
    /// Stock keeping unit
    pub sku: String,
    /// Current unit price
    #[sea_orm(column_type = "Decimal(Some((9, 2)))")]
    pub price: Decimal,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many cart lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// One product appears in many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Canonical detail page for this product.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        format!("/product/{}/", self.slug)
    }
}
