//! Typed parsing of raw form input.
//!
//! Cart and search requests arrive as string fields. Everything is parsed here into
//! typed values, and malformed input is rejected with [`Error::Validation`] before
//! any store operation runs.

use crate::errors::{Error, Result};
use std::collections::HashMap;

/// Longest query text the search log stores.
pub const MAX_QUERY_LENGTH: usize = 50;

/// Raw POST body as field name to value.
pub type PostData = HashMap<String, String>;

fn field<'a>(post: &'a PostData, name: &str) -> Option<&'a str> {
    post.get(name).map(|v| v.trim())
}

fn required<'a>(post: &'a PostData, name: &'static str) -> Result<&'a str> {
    match field(post, name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::validation(name, "is required")),
    }
}

/// Parses a whole-number quantity that may be zero or negative.
///
/// # Errors
/// Returns [`Error::Validation`] if `raw` is not a whole number.
pub fn parse_quantity(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::validation("quantity", format!("must be a whole number, got {raw:?}")))
}

/// Parses a quantity that must be at least one.
///
/// # Errors
/// Returns [`Error::Validation`] if `raw` is not a positive whole number.
pub fn parse_positive_quantity(raw: &str) -> Result<i32> {
    let quantity = parse_quantity(raw)?;
    if quantity <= 0 {
        return Err(Error::validation(
            "quantity",
            format!("must be at least 1, got {quantity}"),
        ));
    }
    Ok(quantity)
}

/// Parses a cart item id.
///
/// # Errors
/// Returns [`Error::Validation`] if `raw` is not a positive integer.
pub fn parse_item_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::validation(
            "item_id",
            format!("must be a positive integer, got {raw:?}"),
        )),
    }
}

/// Add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCartForm {
    /// Slug of the product to add
    pub product_slug: String,
    /// Units to add, defaults to 1
    pub quantity: i32,
}

impl AddToCartForm {
    /// Parses `product_slug` (required) and `quantity` (default `"1"`).
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a missing slug or a non-positive quantity.
    pub fn from_post(post: &PostData) -> Result<Self> {
        let product_slug = required(post, "product_slug")?.to_string();
        let quantity = match field(post, "quantity") {
            Some(raw) if !raw.is_empty() => parse_positive_quantity(raw)?,
            _ => 1,
        };
        Ok(Self {
            product_slug,
            quantity,
        })
    }
}

/// Cart quantity update request. A quantity of zero or less removes the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCartForm {
    /// Line to update
    pub item_id: i64,
    /// New quantity
    pub quantity: i32,
}

impl UpdateCartForm {
    /// Parses `item_id` and `quantity`, both required.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for missing or malformed fields.
    pub fn from_post(post: &PostData) -> Result<Self> {
        let item_id = parse_item_id(required(post, "item_id")?)?;
        let quantity = parse_quantity(required(post, "quantity")?)?;
        Ok(Self { item_id, quantity })
    }
}

/// Remove-from-cart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveFromCartForm {
    /// Line to remove
    pub item_id: i64,
}

impl RemoveFromCartForm {
    /// Parses the required `item_id`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a missing or malformed id.
    pub fn from_post(post: &PostData) -> Result<Self> {
        let item_id = parse_item_id(required(post, "item_id")?)?;
        Ok(Self { item_id })
    }
}

/// Internal search submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    /// Trimmed query text
    pub q: String,
}

impl SearchForm {
    /// Placeholder text shown in an untouched search box.
    pub const DEFAULT_TEXT: &'static str = "Search";

    /// Parses the required query `q`, at most [`MAX_QUERY_LENGTH`] characters.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a missing, placeholder or overlong query.
    pub fn from_post(post: &PostData) -> Result<Self> {
        let q = required(post, "q")?;
        if q == Self::DEFAULT_TEXT {
            return Err(Error::validation("q", "is required"));
        }
        validate_query(q)?;
        Ok(Self { q: q.to_string() })
    }
}

/// Checks query text is non-blank and no longer than [`MAX_QUERY_LENGTH`] characters.
///
/// # Errors
/// Returns [`Error::Validation`] otherwise.
pub fn validate_query(q: &str) -> Result<()> {
    if q.trim().is_empty() {
        return Err(Error::validation("q", "is required"));
    }
    let length = q.chars().count();
    if length > MAX_QUERY_LENGTH {
        return Err(Error::validation(
            "q",
            format!("must be at most {MAX_QUERY_LENGTH} characters, got {length}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn post(fields: &[(&str, &str)]) -> PostData {
        fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_add_form_defaults_quantity_to_one() {
        let form = AddToCartForm::from_post(&post(&[("product_slug", "ruby-ring")])).unwrap();
        assert_eq!(form.product_slug, "ruby-ring");
        assert_eq!(form.quantity, 1);

        let form =
            AddToCartForm::from_post(&post(&[("product_slug", "ruby-ring"), ("quantity", "")]))
                .unwrap();
        assert_eq!(form.quantity, 1);
    }

    #[test]
    fn test_add_form_parses_quantity() {
        let form =
            AddToCartForm::from_post(&post(&[("product_slug", "ring"), ("quantity", " 3 ")]))
                .unwrap();
        assert_eq!(form.quantity, 3);
    }

    #[test]
    fn test_add_form_rejects_bad_input() {
        let err = AddToCartForm::from_post(&post(&[("quantity", "2")])).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "product_slug", .. }));

        let err = AddToCartForm::from_post(&post(&[("product_slug", "ring"), ("quantity", "two")]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "quantity", .. }));

        let err = AddToCartForm::from_post(&post(&[("product_slug", "ring"), ("quantity", "0")]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "quantity", .. }));
    }

    #[test]
    fn test_update_form_allows_non_positive_quantity() {
        let form = UpdateCartForm::from_post(&post(&[("item_id", "12"), ("quantity", "-1")])).unwrap();
        assert_eq!(form, UpdateCartForm { item_id: 12, quantity: -1 });
    }

    #[test]
    fn test_update_form_requires_fields() {
        let err = UpdateCartForm::from_post(&post(&[("quantity", "1")])).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "item_id", .. }));

        let err = UpdateCartForm::from_post(&post(&[("item_id", "1")])).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "quantity", .. }));

        let err = UpdateCartForm::from_post(&post(&[("item_id", "abc"), ("quantity", "1")]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "item_id", .. }));
    }

    #[test]
    fn test_remove_form() {
        let form = RemoveFromCartForm::from_post(&post(&[("item_id", "5")])).unwrap();
        assert_eq!(form.item_id, 5);

        assert!(RemoveFromCartForm::from_post(&post(&[("item_id", "-5")])).is_err());
        assert!(RemoveFromCartForm::from_post(&post(&[])).is_err());
    }

    #[test]
    fn test_search_form() {
        let form = SearchForm::from_post(&post(&[("q", "  rings ")])).unwrap();
        assert_eq!(form.q, "rings");

        assert!(SearchForm::from_post(&post(&[("q", "Search")])).is_err());
        assert!(SearchForm::from_post(&post(&[("q", "   ")])).is_err());

        let long = "x".repeat(MAX_QUERY_LENGTH + 1);
        assert!(SearchForm::from_post(&post(&[("q", &long)])).is_err());

        let exact = "y".repeat(MAX_QUERY_LENGTH);
        assert_eq!(SearchForm::from_post(&post(&[("q", &exact)])).unwrap().q, exact);
    }
}
