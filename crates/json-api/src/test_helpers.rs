//! Test helpers.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use trolley::{
    cart::Cart,
    products::{MockCatalog, ProductId, ProductSnapshot},
    server::MockServerCartStore,
    users::UserId,
};
use trolley_app::{
    auth::MockAuthService,
    context::AppContext,
    domain::products::{MockProductsService, models::Product},
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER: UserId = UserId::new(1);

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_id(TEST_USER);
    ctrl.call_next(req, depot, res).await;
}

fn strict_carts_mock() -> MockServerCartStore {
    let mut carts = MockServerCartStore::new();

    carts.expect_get_or_create().never();
    carts.expect_add_item().never();
    carts.expect_set_quantity().never();
    carts.expect_remove_item().never();
    carts.expect_clear().never();

    carts
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn make_state(
    carts: MockServerCartStore,
    products: MockProductsService,
    auth: MockAuthService,
) -> Arc<State> {
    let mut catalog = MockCatalog::new();

    catalog.expect_lookup().never();

    State::from_app_context(
        AppContext {
            carts: Arc::new(carts),
            products: Arc::new(products),
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
        },
        Duration::from_secs(1),
    )
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    make_state(strict_carts_mock(), strict_products_mock(), auth)
}

pub(crate) fn carts_service(carts: MockServerCartStore, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(make_state(
                carts,
                strict_products_mock(),
                strict_auth_mock(),
            )))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(make_state(
                strict_carts_mock(),
                products,
                strict_auth_mock(),
            )))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn make_product(id: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(1250, 2),
        image: None,
        in_stock: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A cart holding `quantity` units of one product priced at 12.50.
pub(crate) fn make_cart(product: i64, quantity: u32) -> Cart {
    let mut cart = Cart::default();

    cart.add(&ProductSnapshot::from(&make_product(product)), quantity);

    cart
}
