//! Set Cart Item Quantity Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use trolley::products::ProductId;

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, SetCartItemQuantityRequest},
    },
    extensions::*,
    state::State,
};

/// Set Cart Item Quantity Handler
///
/// Overwrites the quantity of an existing line. A quantity of zero or less removes the line.
#[endpoint(
    tags("carts"),
    summary = "Set Cart Item Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid product or quantity"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::FORBIDDEN, description = "Cart belongs to another user"),
        (status_code = StatusCode::NOT_FOUND, description = "Product is not in the cart"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<i64>,
    product: PathParam<i64>,
    json: JsonBody<SetCartItemQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.owner_or_403(user.into_inner())?;

    let cart = state
        .app
        .carts
        .set_quantity(
            user,
            ProductId::new(product.into_inner()),
            json.into_inner().quantity,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::from(&cart)))
}
