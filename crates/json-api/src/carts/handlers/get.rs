//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the user's cart, creating an empty one on first access.
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart belongs to another user"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<i64>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.owner_or_403(user.into_inner())?;

    let cart = state
        .app
        .carts
        .get_or_create(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::from(&cart)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;
    use trolley::server::{MockServerCartStore, ServerCartError};

    use crate::test_helpers::{TEST_USER, carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockServerCartStore) -> Service {
        carts_service(carts, Router::with_path("users/{user}/cart").get(handler))
    }

    #[tokio::test]
    async fn test_get_returns_cart_payload() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_get_or_create()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| Ok(make_cart(5, 2)));

        let mut res = TestClient::get(format!("http://example.com/users/{TEST_USER}/cart"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(
            body,
            json!({
                "items": [{
                    "productId": 5,
                    "id": 5,
                    "name": "Product 5",
                    "price": 12.5,
                    "image": null,
                    "quantity": 2,
                    "inStock": true,
                }],
                "total": 25.0,
                "itemCount": 2,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_get_other_users_cart_returns_403() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts.expect_get_or_create().never();

        let res = TestClient::get("http://example.com/users/99/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_storage_failure_returns_500() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_get_or_create()
            .once()
            .return_once(|_| Err(ServerCartError::Unavailable("pool closed".to_string())));

        let res = TestClient::get(format!("http://example.com/users/{TEST_USER}/cart"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
