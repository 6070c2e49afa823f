//! Unified error type for the storefront core.
//!
//! Every fallible operation returns [`Result`]. The `*NotFound` variants map to a
//! "missing resource" response in a web-facing caller, [`Error::Validation`] to a
//! bad-request response.

use crate::entities::order::OrderStatus;
use thiserror::Error;

/// Errors produced by the cart, checkout and search operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// No product carries the given slug
    #[error("Product not found: {slug}")]
    ProductNotFound {
        /// Slug that was looked up
        slug: String,
    },

    /// The cart item does not exist or belongs to another cart
    #[error("Cart item not found: {item_id}")]
    CartItemNotFound {
        /// Item id that was looked up
        item_id: i64,
    },

    /// No order with the given id
    #[error("Order not found: {order_id}")]
    OrderNotFound {
        /// Order id that was looked up
        order_id: i64,
    },

    /// Malformed or out-of-range input
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The requested order status change is not in the transition table
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Checkout was attempted on a cart with no lines
    #[error("Cart is empty")]
    EmptyCart,

    /// Underlying SeaORM failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a [`Error::Validation`] for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for the "missing resource" family of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound { .. } | Self::CartItemNotFound { .. } | Self::OrderNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(Error::ProductNotFound { slug: "x".into() }.is_not_found());
        assert!(Error::CartItemNotFound { item_id: 1 }.is_not_found());
        assert!(Error::OrderNotFound { order_id: 1 }.is_not_found());
        assert!(!Error::EmptyCart.is_not_found());
        assert!(!Error::validation("quantity", "bad").is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::validation("quantity", "must be a whole number");
        assert_eq!(err.to_string(), "Invalid quantity: must be a whole number");

        let err = Error::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Submitted,
        };
        assert_eq!(err.to_string(), "Cannot move order from Shipped to Submitted");
    }
}
