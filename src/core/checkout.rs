//! Order ledger - Turns a cart into a priced order and drives the order lifecycle.
//!
//! Order items copy the product's unit price at the moment the order is placed, so
//! later catalog price changes never alter a historical order. Status changes go
//! through [`advance`], which only permits the moves in
//! [`OrderStatus::next_statuses`].

use crate::{
    core::{
        cart::{self, CartLine},
        cart_id::CartId,
    },
    entities::{Order, OrderItem, OrderStatus, Product, order, order_item, product},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::fmt;
use std::net::IpAddr;
use tracing::{debug, info, instrument, warn};

/// Buyer contact details.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactInfo {
    /// E-mail address, at most 50 characters
    pub email: String,
    /// Phone number, at most 20 characters
    pub phone: String,
}

/// A postal address as captured on the checkout form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    /// Addressee
    pub name: String,
    /// First street line
    pub address_1: String,
    /// Optional second street line
    pub address_2: String,
    /// City
    pub city: String,
    /// Two-letter state code
    pub state: String,
    /// Country
    pub country: String,
    /// Postal code
    pub zip: String,
}

/// Everything needed to submit an order besides the cart contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    /// Buyer contact details
    pub contact: ContactInfo,
    /// Where the goods go
    pub shipping: Address,
    /// Where the invoice goes
    pub billing: Address,
    /// Address the order was placed from
    pub ip_address: IpAddr,
    /// Payment gateway transaction reference
    pub transaction_id: String,
    /// Signed-in account, if any
    pub user_id: Option<i64>,
}

/// An order item joined with its product, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderLine {
    /// The stored order item
    pub item: order_item::Model,
    /// The product it refers to
    pub product: product::Model,
}

impl OrderLine {
    /// Product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.product.name
    }

    /// Product sku.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.product.sku
    }

    /// Quantity times the captured unit price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.item.total()
    }

    /// Product detail page.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        self.product.absolute_url()
    }
}

impl fmt::Display for OrderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.product.name, self.product.sku)
    }
}

const MAX_EMAIL_LENGTH: usize = 50;
const MAX_PHONE_LENGTH: usize = 20;
const MAX_TRANSACTION_ID_LENGTH: usize = 20;

// name, address_1, address_2, city, state, country, zip
const ADDRESS_LIMITS: [usize; 7] = [50, 50, 50, 50, 2, 50, 10];
const SHIPPING_FIELDS: [&str; 7] = [
    "shipping_name",
    "shipping_address_1",
    "shipping_address_2",
    "shipping_city",
    "shipping_state",
    "shipping_country",
    "shipping_zip",
];
const BILLING_FIELDS: [&str; 7] = [
    "billing_name",
    "billing_address_1",
    "billing_address_2",
    "billing_city",
    "billing_state",
    "billing_country",
    "billing_zip",
];
const OPTIONAL_ADDRESS_FIELD: usize = 2;

fn check_length(field: &'static str, value: &str, max: usize, required: bool) -> Result<()> {
    if required && value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    let length = value.chars().count();
    if length > max {
        return Err(Error::validation(
            field,
            format!("must be at most {max} characters, got {length}"),
        ));
    }
    Ok(())
}

impl Address {
    fn values(&self) -> [&str; 7] {
        [
            &self.name,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.country,
            &self.zip,
        ]
    }

    fn validate(&self, fields: &[&'static str; 7]) -> Result<()> {
        for (index, ((field, value), max)) in fields
            .iter()
            .copied()
            .zip(self.values())
            .zip(ADDRESS_LIMITS)
            .enumerate()
        {
            check_length(field, value, max, index != OPTIONAL_ADDRESS_FIELD)?;
        }
        Ok(())
    }
}

impl NewOrder {
    /// Checks every field against its length limit and required-ness.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_length("email", &self.contact.email, MAX_EMAIL_LENGTH, true)?;
        match self.contact.email.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(Error::validation("email", "must be an e-mail address")),
        }
        check_length("phone", &self.contact.phone, MAX_PHONE_LENGTH, true)?;
        self.shipping.validate(&SHIPPING_FIELDS)?;
        self.billing.validate(&BILLING_FIELDS)?;
        check_length(
            "transaction_id",
            &self.transaction_id,
            MAX_TRANSACTION_ID_LENGTH,
            true,
        )?;
        Ok(())
    }
}

/// Account page for the order with `order_id`.
#[must_use]
pub fn order_detail_url(order_id: i64) -> String {
    format!("/my_account/order_details/{order_id}/")
}

/// Inserts a new order in [`OrderStatus::Submitted`].
///
/// # Errors
/// Returns [`Error::Validation`] for invalid contact/address fields, or a database error.
pub async fn create_order<C>(db: &C, new_order: &NewOrder) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    new_order.validate()?;

    let now = Utc::now();
    let NewOrder {
        contact,
        shipping,
        billing,
        ip_address,
        transaction_id,
        user_id,
    } = new_order;

    let order = order::ActiveModel {
        email: Set(contact.email.trim().to_string()),
        phone: Set(contact.phone.trim().to_string()),
        shipping_name: Set(shipping.name.clone()),
        shipping_address_1: Set(shipping.address_1.clone()),
        shipping_address_2: Set(shipping.address_2.clone()),
        shipping_city: Set(shipping.city.clone()),
        shipping_state: Set(shipping.state.clone()),
        shipping_country: Set(shipping.country.clone()),
        shipping_zip: Set(shipping.zip.clone()),
        billing_name: Set(billing.name.clone()),
        billing_address_1: Set(billing.address_1.clone()),
        billing_address_2: Set(billing.address_2.clone()),
        billing_city: Set(billing.city.clone()),
        billing_state: Set(billing.state.clone()),
        billing_country: Set(billing.country.clone()),
        billing_zip: Set(billing.zip.clone()),
        date: Set(now),
        status: Set(OrderStatus::Submitted),
        ip_address: Set(ip_address.to_string()),
        last_updated: Set(now),
        user_id: Set(*user_id),
        transaction_id: Set(transaction_id.trim().to_string()),
        ..Default::default()
    };

    let order = order.insert(db).await?;
    debug!("Created {}", order);
    Ok(order)
}

/// Copies each cart line into an order item, freezing the product's current price.
pub async fn snapshot_cart_into_order<C>(
    db: &C,
    order: &order::Model,
    lines: &[CartLine],
) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = order_item::ActiveModel {
            product_id: Set(line.product.id),
            quantity: Set(line.item.quantity),
            price: Set(line.product.price),
            order_id: Set(order.id),
            ..Default::default()
        };
        items.push(item.insert(db).await?);
    }
    debug!("Snapshotted {} cart lines into {}", items.len(), order);
    Ok(items)
}

/// Looks an order up by id.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if it does not exist.
pub async fn get_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

/// The stored items of an order, in insertion order.
pub async fn order_items<C>(db: &C, order_id: i64) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The items of an order joined with their products.
pub async fn order_lines<C>(db: &C, order_id: i64) -> Result<Vec<OrderLine>>
where
    C: ConnectionTrait,
{
    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| match product {
            Some(product) => Some(OrderLine { item, product }),
            None => {
                warn!("Order item {} refers to missing product {}", item.id, item.product_id);
                None
            }
        })
        .collect())
}

/// Sum of the order's item totals at their captured prices.
pub async fn order_total<C>(db: &C, order_id: i64) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let items = order_items(db, order_id).await?;
    Ok(items
        .iter()
        .fold(Decimal::ZERO, |total, item| total + item.total()))
}

/// Moves an order to `new_status` if the transition table allows it.
///
/// # Errors
/// - [`Error::OrderNotFound`] if the order does not exist
/// - [`Error::InvalidTransition`] if the move is not allowed from the current status
pub async fn advance<C>(db: &C, order_id: i64, new_status: OrderStatus) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let order = get_order(db, order_id).await?;
    let current = order.status;

    if !current.can_transition_to(new_status) {
        warn!(
            "Rejected status change for order {}: {} -> {}",
            order_id, current, new_status
        );
        return Err(Error::InvalidTransition {
            from: current,
            to: new_status,
        });
    }

    let mut order: order::ActiveModel = order.into();
    order.status = Set(new_status);
    order.last_updated = Set(Utc::now());
    let order = order.update(db).await?;

    info!("{} moved from {} to {}", order, current, new_status);
    Ok(order)
}

/// Checks out a cart: creates the order, snapshots the lines and empties the cart,
/// all in one database transaction.
///
/// # Errors
/// - [`Error::EmptyCart`] if the cart has no lines
/// - [`Error::Validation`] for invalid order details
/// - a database error; nothing is written in that case
#[instrument(skip(db, cart_id, new_order))]
pub async fn place_order(
    db: &DatabaseConnection,
    cart_id: &CartId,
    new_order: &NewOrder,
) -> Result<order::Model> {
    new_order.validate()?;

    let txn = db.begin().await?;

    let lines = cart::list_items(&txn, cart_id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    let order = create_order(&txn, new_order).await?;
    let items = snapshot_cart_into_order(&txn, &order, &lines).await?;
    cart::empty(&txn, cart_id).await?;

    txn.commit().await?;

    info!("{} placed with {} items", order, items.len());
    Ok(order)
}

/// Orders placed by `user_id`, newest first.
pub async fn orders_for_user<C>(db: &C, user_id: i64) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::Date)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
