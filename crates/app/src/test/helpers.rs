//! Test Helpers

use rust_decimal::Decimal;
use trolley::{
    cart::Cart,
    products::ProductId,
    server::{ServerCartError, ServerCartStore},
    users::UserId,
};

use crate::{
    domain::{
        products::{
            ProductsService, ProductsServiceError,
            models::{NewProduct, Product},
        },
        users::{
            UsersService, UsersServiceError,
            models::{NewUser, User},
        },
    },
    test::TestContext,
};

pub(crate) async fn create_user(ctx: &TestContext, name: &str) -> Result<User, UsersServiceError> {
    ctx.users
        .create_user(NewUser {
            name: name.to_string(),
        })
        .await
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: Decimal,
) -> Result<Product, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            name: name.to_string(),
            price,
            image: None,
            in_stock: true,
        })
        .await
}

pub(crate) async fn add_item(
    ctx: &TestContext,
    user: UserId,
    product: ProductId,
    quantity: u32,
) -> Result<Cart, ServerCartError> {
    ctx.carts.add_item(user, product, quantity).await
}
