//! Cart request and response bodies.

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use trolley::{cart::Cart, items::CartLineItem};

/// Cart Response
///
/// Same layout as the cart kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// Line items, oldest first
    pub items: Vec<CartItemResponse>,

    /// Sum of price times quantity over all lines
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total: Decimal,

    /// Sum of quantities over all lines
    pub item_count: u64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    /// Product id
    pub product_id: i64,

    /// Product id, repeated for clients keyed on `id`
    pub id: i64,

    /// Product name
    pub name: String,

    /// Unit price
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub price: Decimal,

    /// Product image reference
    pub image: Option<String>,

    /// Units of the product in the cart
    pub quantity: u32,

    /// Whether the product can currently be purchased
    pub in_stock: bool,
}

impl From<&CartLineItem> for CartItemResponse {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id.get(),
            id: item.product_id.get(),
            name: item.name.clone(),
            price: item.unit_price,
            image: item.image.clone(),
            quantity: item.quantity,
            in_stock: item.in_stock,
        }
    }
}

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    /// Product to add
    pub product_id: i64,

    /// Units to add to any existing line
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Set Cart Item Quantity Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetCartItemQuantityRequest {
    /// New absolute quantity; zero or less removes the line
    pub quantity: i64,
}
