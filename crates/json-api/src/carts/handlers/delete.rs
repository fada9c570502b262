//! Clear Cart Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::debug;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Clear Cart Handler
///
/// Removes every line from the user's cart. The cart itself is kept.
#[endpoint(
    tags("carts"),
    summary = "Clear Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart cleared"),
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
        .clear(user)
        .await
        .map_err(into_status_error)?;

    debug!(%user, "cart cleared");

    Ok(Json(CartResponse::from(&cart)))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;
    use trolley::{cart::Cart, server::MockServerCartStore};

    use crate::test_helpers::{TEST_USER, carts_service};

    use super::*;

    fn make_service(carts: MockServerCartStore) -> Service {
        carts_service(carts, Router::with_path("users/{user}/cart").delete(handler))
    }

    #[tokio::test]
    async fn test_clear_returns_empty_cart() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts
            .expect_clear()
            .once()
            .withf(|user| *user == TEST_USER)
            .return_once(|_| Ok(Cart::default()));

        let mut res = TestClient::delete(format!("http://example.com/users/{TEST_USER}/cart"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: CartResponse = res.take_json().await?;

        assert!(body.items.is_empty(), "expected no lines, got {body:?}");
        assert_eq!(body.item_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_other_users_cart_returns_403() -> TestResult {
        let mut carts = MockServerCartStore::new();

        carts.expect_clear().never();

        let res = TestClient::delete("http://example.com/users/2/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
