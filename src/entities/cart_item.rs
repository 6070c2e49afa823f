//! Cart item entity - One product line in a shopper's cart.
//!
//! Rows are grouped by the opaque `cart_id` token held in the shopper's session.
//! The (`cart_id`, `product_id`) pair is unique; see
//! [`crate::config::database::create_tables`] for the index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Session cart token owning this line
    #[sea_orm(column_type = "String(StringLen::N(50))", indexed)]
    pub cart_id: String,
    /// Product in the cart
    pub product_id: i64,
    /// Number of units, always positive
    pub quantity: i32,
    /// When the line was first added
    pub added_at: DateTimeUtc,
}

/// Defines relationships between `CartItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line refers to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
