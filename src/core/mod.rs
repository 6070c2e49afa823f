/// Shopper cart lines: add, update, remove, totals and stale cart expiry
pub mod cart;
/// Session-held cart identifier generation and lookup
pub mod cart_id;
/// Product lookups and catalog seeding
pub mod catalog;
/// Order placement, order items and the order status lifecycle
pub mod checkout;
/// Typed parsing of raw form fields
pub mod forms;
/// Internal search query log
pub mod search;
