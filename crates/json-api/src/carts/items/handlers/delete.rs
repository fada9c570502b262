//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use trolley::products::ProductId;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
///
/// Deletes a product's line. Removing a product that is not in the cart succeeds.
#[endpoint(
    tags("carts"),
    summary = "Remove Item from Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid product id"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<i64>,
    product: PathParam<i64>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.owner_or_403(user.into_inner())?;

    let cart = state
        .app
        .carts
        .remove_item(user, ProductId::new(product.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::from(&cart)))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;
    use trolley::{
        cart::Cart,
        server::{MockServerCartStore, ServerCartError},
    };

    use crate::test_helpers::{TEST_USER, carts_service};

    use super::*;

    fn make_service(carts: MockServerCartStore) -> Service {
        carts_service(
            carts,
            Router::with_path("users/{user}/cart/items/{product}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_remove_item_returns_200() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_remove_item()
            .once()
            .withf(|user, product| *user == TEST_USER && *product == ProductId::new(7))
            .return_once(|_, _| Ok(Cart::default()));

        let res = TestClient::delete(format!("http://example.com/users/{TEST_USER}/cart/items/7"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_invalid_product_returns_400() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_remove_item()
            .once()
            .withf(|_, product| *product == ProductId::new(0))
            .return_once(|_, _| {
                Err(ServerCartError::Validation(
                    "product id must be positive, got 0".to_string(),
                ))
            });

        let res = TestClient::delete(format!("http://example.com/users/{TEST_USER}/cart/items/0"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
