//! Entity module - SeaORM definitions for the storefront tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod search_term;

// Re-export specific types to avoid conflicts
pub use cart_item::{Column as CartItemColumn, Entity as CartItem, Model as CartItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use search_term::{
    Column as SearchTermColumn, Entity as SearchTerm, Model as SearchTermModel,
};
