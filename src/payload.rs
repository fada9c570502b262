//! Serialized cart layout.
//!
//! The same JSON shape is used for the local storage blob and for cart responses from the
//! JSON API: `{items: [{productId, id, name, price, image, quantity, inStock}], total, itemCount}`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::Cart, items::CartLineItem, pricing::checked_totals, products::ProductId};

/// A serialized cart that cannot be turned back into a [`Cart`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// A line total or the cart total does not fit in a decimal amount.
    #[error("cart total is out of range")]
    TotalOutOfRange,
}

/// Serialized cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    /// Line items
    #[serde(default)]
    pub items: Vec<LineItemPayload>,

    /// Stored total; informational only, recomputed on read
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total: Decimal,

    /// Stored item count; informational only, recomputed on read
    #[serde(default)]
    pub item_count: u64,
}

/// Serialized line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    /// Product id
    pub product_id: i64,

    /// Mirror of `productId`
    #[serde(default)]
    pub id: i64,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price
    #[serde(default, with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Quantity; non-positive values are dropped on read
    pub quantity: i64,

    /// Stock flag
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

const fn in_stock_default() -> bool {
    true
}

impl From<&CartLineItem> for LineItemPayload {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id.get(),
            id: item.product_id.get(),
            name: item.name.clone(),
            price: item.unit_price,
            image: item.image.clone(),
            quantity: i64::from(item.quantity),
            in_stock: item.in_stock,
        }
    }
}

impl From<&Cart> for CartPayload {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(LineItemPayload::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

impl TryFrom<CartPayload> for Cart {
    type Error = PayloadError;

    /// Lines with an invalid product id or a non-positive quantity are dropped, duplicates
    /// are merged, and totals are recomputed from the remaining lines.
    ///
    /// Fails when the recomputed totals overflow.
    fn try_from(payload: CartPayload) -> Result<Self, Self::Error> {
        let cart = Cart::from_items(payload.items.into_iter().filter_map(|item| {
            let product_id = ProductId::new(item.product_id);
            let quantity = u32::try_from(item.quantity).ok()?;

            product_id.is_valid().then_some(CartLineItem {
                product_id,
                quantity,
                unit_price: item.price,
                name: item.name,
                image: item.image,
                in_stock: item.in_stock,
            })
        }));

        checked_totals(cart.items()).ok_or(PayloadError::TotalOutOfRange)?;

        Ok(cart)
    }
}
