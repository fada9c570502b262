//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use trolley::products::ProductId;

use crate::{
    carts::{
        errors::into_status_error,
        models::{AddCartItemRequest, CartResponse},
    },
    extensions::*,
    state::State,
};

/// Add Cart Item Handler
///
/// Adds units of a product, incrementing the line when the product is already in the cart.
#[endpoint(
    tags("carts"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid product or quantity"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<i64>,
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.owner_or_403(user.into_inner())?;

    let request = json.into_inner();

    let cart = state
        .app
        .carts
        .add_item(user, ProductId::new(request.product_id), request.quantity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::from(&cart)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use trolley::server::{MockServerCartStore, ServerCartError};

    use crate::test_helpers::{TEST_USER, carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockServerCartStore) -> Service {
        carts_service(
            carts,
            Router::with_path("users/{user}/cart/items").post(handler),
        )
    }

    #[tokio::test]
    async fn test_add_item_returns_updated_cart() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_add_item()
            .once()
            .withf(|user, product, quantity| {
                *user == TEST_USER && *product == ProductId::new(5) && *quantity == 2
            })
            .return_once(|_, _, _| Ok(make_cart(5, 2)));

        let mut res = TestClient::post(format!("http://example.com/users/{TEST_USER}/cart/items"))
            .json(&json!({ "productId": 5, "quantity": 2 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartResponse = res.take_json().await?;

        assert_eq!(body.item_count, 2);
        assert_eq!(body.items.first().map(|item| item.product_id), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_without_quantity_adds_one() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_add_item()
            .once()
            .withf(|_, _, quantity| *quantity == 1)
            .return_once(|_, _, _| Ok(make_cart(5, 1)));

        let res = TestClient::post(format!("http://example.com/users/{TEST_USER}/cart/items"))
            .json(&json!({ "productId": 5 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_validation_failure_returns_400() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| {
                Err(ServerCartError::Validation(
                    "quantity must be at least 1".to_string(),
                ))
            });

        let res = TestClient::post(format!("http://example.com/users/{TEST_USER}/cart/items"))
            .json(&json!({ "productId": 5, "quantity": 0 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_unknown_product_returns_404() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(ServerCartError::NotFound));

        let res = TestClient::post(format!("http://example.com/users/{TEST_USER}/cart/items"))
            .json(&json!({ "productId": 404, "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_other_users_cart_returns_403() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts.expect_add_item().never();

        let res = TestClient::post("http://example.com/users/3/cart/items")
            .json(&json!({ "productId": 5, "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
