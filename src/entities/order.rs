//! Order entity - The priced, durable record created from a cart at checkout.
//!
//! Contact, shipping and billing fields are a snapshot taken when the order is
//! submitted. `status` follows the lifecycle encoded in [`OrderStatus`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order, stored as its integer code.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum OrderStatus {
    /// Payment was accepted and the order saved
    #[sea_orm(num_value = 1)]
    Submitted,
    /// Reviewed and ready for shipping
    #[sea_orm(num_value = 2)]
    Processed,
    /// Handed off to the carrier
    #[sea_orm(num_value = 3)]
    Shipped,
    /// Terminated by the customer
    #[sea_orm(num_value = 4)]
    Cancelled,
}

impl OrderStatus {
    /// Statuses reachable in one step from `self`.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::Processed, Self::Cancelled],
            Self::Processed => &[Self::Shipped],
            Self::Shipped | Self::Cancelled => &[],
        }
    }

    /// Whether the transition table allows moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Shipped and cancelled orders never change again.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Shipped | Self::Cancelled)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Processed => "Processed",
            Self::Shipped => "Shipped",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,

    // contact info
    /// Buyer e-mail address
    pub email: String,
    /// Buyer phone number
    pub phone: String,

    // shipping information
    /// Recipient name
    pub shipping_name: String,
    /// First street line
    pub shipping_address_1: String,
    /// Second street line, may be blank
    pub shipping_address_2: String,
    /// City
    pub shipping_city: String,
    /// Two-letter state code
    pub shipping_state: String,
    /// Country
    pub shipping_country: String,
    /// Postal code
    pub shipping_zip: String,

    // billing information
    /// Card holder name
    pub billing_name: String,
    /// First street line
    pub billing_address_1: String,
    /// Second street line, may be blank
    pub billing_address_2: String,
    /// City
    pub billing_city: String,
    /// Two-letter state code
    pub billing_state: String,
    /// Country
    pub billing_country: String,
    /// Postal code
    pub billing_zip: String,

    // order info
    /// When the order was submitted
    pub date: DateTimeUtc,
    /// Current lifecycle state
    pub status: OrderStatus,
    /// Address the order was placed from
    pub ip_address: String,
    /// Refreshed on every status change
    pub last_updated: DateTimeUtc,
    /// Account that placed the order, if signed in
    pub user_id: Option<i64>,
    /// Payment gateway transaction reference
    pub transaction_id: String,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Account page showing this order.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        crate::core::checkout::order_detail_url(self.id)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order #{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_transition_table() {
        use OrderStatus::{Cancelled, Processed, Shipped, Submitted};

        assert!(Submitted.can_transition_to(Processed));
        assert!(Processed.can_transition_to(Shipped));
        assert!(Submitted.can_transition_to(Cancelled));

        assert!(!Submitted.can_transition_to(Shipped));
        assert!(!Submitted.can_transition_to(Submitted));
        assert!(!Processed.can_transition_to(Cancelled));
        assert!(!Processed.can_transition_to(Submitted));
        assert!(!Shipped.can_transition_to(Processed));
        assert!(!Cancelled.can_transition_to(Submitted));
    }

    #[test]
    fn test_final_statuses_have_no_successors() {
        for status in OrderStatus::iter() {
            assert_eq!(status.is_final(), status.next_statuses().is_empty());
        }
    }

    #[test]
    fn test_status_codes_match_stored_values() {
        assert_eq!(OrderStatus::Submitted.to_value(), 1);
        assert_eq!(OrderStatus::Processed.to_value(), 2);
        assert_eq!(OrderStatus::Shipped.to_value(), 3);
        assert_eq!(OrderStatus::Cancelled.to_value(), 4);
    }
}
