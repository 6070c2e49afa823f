//! Cart store - Line items keyed by the session's cart id.
//!
//! Every operation takes the [`CartId`] explicitly and scopes its queries to it, so
//! one cart can never read or modify another cart's lines. Adding a product that is
//! already in the cart increments the existing line in a single upsert statement.
//! Prices are never stored on cart lines: totals always use the live catalog price.

use crate::{
    core::{cart_id::CartId, catalog},
    entities::{CartItem, Product, cart_item, product},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{QueryOrder, QuerySelect, Select, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// A cart item joined with the product it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    /// The stored cart row
    pub item: cart_item::Model,
    /// The product as it is in the catalog right now
    pub product: product::Model,
}

impl CartLine {
    /// Cart item id.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.item.id
    }

    /// Units of the product in the cart.
    #[must_use]
    pub const fn quantity(&self) -> i32 {
        self.item.quantity
    }

    /// Product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.product.name
    }

    /// Live unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.product.price
    }

    /// Quantity times live unit price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.product.price * Decimal::from(self.item.quantity)
    }

    /// Product detail page.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        self.product.absolute_url()
    }
}

/// Outcome of an expiry run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpiryReport {
    /// Carts whose latest line was added before this instant were removed
    pub cutoff: DateTime<Utc>,
    /// Ids of the removed carts, sorted
    pub removed_carts: Vec<CartId>,
    /// Number of cart item rows deleted
    pub items_removed: u64,
}

impl ExpiryReport {
    /// Number of carts removed.
    #[must_use]
    pub fn carts_removed(&self) -> usize {
        self.removed_carts.len()
    }
}

fn scoped(cart_id: &CartId) -> Select<CartItem> {
    CartItem::find().filter(cart_item::Column::CartId.eq(cart_id.as_str()))
}

/// All lines of the cart, oldest first.
pub async fn list_items<C>(db: &C, cart_id: &CartId) -> Result<Vec<CartLine>>
where
    C: ConnectionTrait,
{
    let rows = scoped(cart_id)
        .order_by_asc(cart_item::Column::AddedAt)
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| match product {
            Some(product) => Some(CartLine { item, product }),
            None => {
                warn!("Cart item {} refers to missing product {}", item.id, item.product_id);
                None
            }
        })
        .collect())
}

/// Adds `quantity` units of the product with `product_slug` to the cart.
///
/// If the cart already holds the product its quantity is incremented, otherwise a new
/// line is created. Both cases are one `INSERT .. ON CONFLICT DO UPDATE` statement on
/// the (`cart_id`, `product_id`) unique index, so concurrent adds cannot produce
/// duplicate lines or lose an increment.
///
/// # Errors
/// - [`Error::Validation`] if `quantity` is not positive
/// - [`Error::ProductNotFound`] if the slug is unknown
#[instrument(skip(db, cart_id))]
pub async fn add(
    db: &DatabaseConnection,
    cart_id: &CartId,
    product_slug: &str,
    quantity: i32,
) -> Result<CartLine> {
    if quantity <= 0 {
        return Err(Error::validation(
            "quantity",
            format!("must be at least 1, got {quantity}"),
        ));
    }

    let txn = db.begin().await?;
    let product = catalog::get_product_by_slug(&txn, product_slug).await?;

    let line = cart_item::ActiveModel {
        cart_id: Set(cart_id.as_str().to_string()),
        product_id: Set(product.id),
        quantity: Set(quantity),
        added_at: Set(Utc::now()),
        ..Default::default()
    };
    CartItem::insert(line)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col((CartItem, cart_item::Column::Quantity)).add(quantity),
                )
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let item = scoped(cart_id)
        .filter(cart_item::Column::ProductId.eq(product.id))
        .one(&txn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("cart line for product {}", product.id)))?;

    txn.commit().await?;

    debug!(
        "Cart line {} for {} now has quantity {}",
        item.id, product.slug, item.quantity
    );
    Ok(CartLine { item, product })
}

/// Fetches one line, scoped to the owning cart.
///
/// # Errors
/// Returns [`Error::CartItemNotFound`] if the item does not exist or belongs to
/// another cart.
pub async fn get_item<C>(db: &C, cart_id: &CartId, item_id: i64) -> Result<cart_item::Model>
where
    C: ConnectionTrait,
{
    scoped(cart_id)
        .filter(cart_item::Column::Id.eq(item_id))
        .one(db)
        .await?
        .ok_or(Error::CartItemNotFound { item_id })
}

/// Sets the quantity of a line, removing it when `quantity` is zero or negative.
///
/// Returns the updated line, or `None` if it was removed.
///
/// # Errors
/// Returns [`Error::CartItemNotFound`] if the item is not in this cart.
pub async fn update_quantity<C>(
    db: &C,
    cart_id: &CartId,
    item_id: i64,
    quantity: i32,
) -> Result<Option<cart_item::Model>>
where
    C: ConnectionTrait,
{
    let item = get_item(db, cart_id, item_id).await?;

    if quantity > 0 {
        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity);
        let item = item.update(db).await?;
        debug!("Cart line {} set to quantity {}", item.id, quantity);
        Ok(Some(item))
    } else {
        remove(db, cart_id, item_id).await?;
        Ok(None)
    }
}

/// Deletes a line from the cart. Returns whether a row was deleted; an absent
/// item is not an error.
pub async fn remove<C>(db: &C, cart_id: &CartId, item_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id.as_str()))
        .filter(cart_item::Column::Id.eq(item_id))
        .exec(db)
        .await?;
    debug!("Removed cart line {} ({} rows)", item_id, result.rows_affected);
    Ok(result.rows_affected > 0)
}

/// Sum of quantity times live price over every line, in exact decimal arithmetic.
pub async fn subtotal<C>(db: &C, cart_id: &CartId) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let lines = list_items(db, cart_id).await?;
    Ok(lines
        .iter()
        .fold(Decimal::ZERO, |total, line| total + line.total()))
}

/// Number of lines in the cart (not the number of units).
pub async fn distinct_item_count<C>(db: &C, cart_id: &CartId) -> Result<u64>
where
    C: ConnectionTrait,
{
    scoped(cart_id).count(db).await.map_err(Into::into)
}

/// Whether the cart has no lines.
pub async fn is_empty<C>(db: &C, cart_id: &CartId) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(distinct_item_count(db, cart_id).await? == 0)
}

/// Deletes every line of the cart, returning the number of rows deleted.
pub async fn empty<C>(db: &C, cart_id: &CartId) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id.as_str()))
        .exec(db)
        .await?;
    debug!("Emptied cart ({} rows)", result.rows_affected);
    Ok(result.rows_affected)
}

/// Removes every cart with no line added in the last `max_age_days` days.
///
/// # Errors
/// Returns [`Error::Validation`] for a negative or out-of-range window, or a database
/// error; on error nothing is deleted.
pub async fn expire_stale_carts(
    db: &DatabaseConnection,
    max_age_days: i64,
) -> Result<ExpiryReport> {
    let cutoff = Duration::try_days(max_age_days)
        .filter(|window| *window >= Duration::zero())
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| {
            Error::validation(
                "max_age_days",
                format!("must be a non-negative number of days, got {max_age_days}"),
            )
        })?;
    expire_stale_carts_before(db, cutoff).await
}

/// Removes every cart whose most recent line was added strictly before `cutoff`.
///
/// Carts are judged by their latest `added_at`, so a cart with any recent line is
/// kept whole even if it also holds old lines. Runs in one transaction.
#[instrument(skip(db))]
pub async fn expire_stale_carts_before(
    db: &DatabaseConnection,
    cutoff: DateTime<Utc>,
) -> Result<ExpiryReport> {
    info!("Removing old carts");
    let txn = db.begin().await?;

    let rows: Vec<(String, DateTime<Utc>)> = CartItem::find()
        .select_only()
        .column(cart_item::Column::CartId)
        .column(cart_item::Column::AddedAt)
        .into_tuple()
        .all(&txn)
        .await?;

    let mut last_change: HashMap<String, DateTime<Utc>> = HashMap::new();
    for (cart_id, added_at) in rows {
        last_change
            .entry(cart_id)
            .and_modify(|latest| *latest = (*latest).max(added_at))
            .or_insert(added_at);
    }

    let mut stale: Vec<String> = last_change
        .into_iter()
        .filter(|(_, latest)| *latest < cutoff)
        .map(|(cart_id, _)| cart_id)
        .collect();
    stale.sort_unstable();

    let items_removed = if stale.is_empty() {
        0
    } else {
        CartItem::delete_many()
            .filter(cart_item::Column::CartId.is_in(stale.iter().map(String::as_str)))
            .exec(&txn)
            .await?
            .rows_affected
    };

    txn.commit().await?;
    info!("{} carts were removed", stale.len());

    Ok(ExpiryReport {
        cutoff,
        removed_carts: stale.into_iter().map(CartId::new).collect(),
        items_removed,
    })
}
