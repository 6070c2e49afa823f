//! Order item entity - One purchased product line of an order.
//!
//! `price` is the unit price copied from the catalog when the order was placed.
//! It is history: later catalog price changes never touch it.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Purchased product
    pub product_id: i64,
    /// Number of units purchased
    pub quantity: i32,
    /// Unit price at purchase time
    #[sea_orm(column_type = "Decimal(Some((9, 2)))")]
    pub price: Decimal,
    /// Owning order
    pub order_id: i64,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each line refers to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Extended price of this line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
