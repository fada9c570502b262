//! Carts service.
//!
//! [`PgCartsService`] is the `PostgreSQL` implementation of [`ServerCartStore`]. Every call runs
//! in a single transaction: resolve (or create) the user's cart, apply one statement, then read
//! back the hydrated lines.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{debug, error};
use trolley::{
    cart::Cart,
    items::CartLineItem,
    products::ProductId,
    server::{
        ServerCartError, ServerCartStore, line_quantity, validate_insert_quantity,
        validate_product,
    },
    users::UserId,
};

use crate::{
    database::Db,
    domain::carts::{
        errors::CartsServiceError,
        repositories::{PgCartItemsRepository, PgCartsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
        }
    }

    async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: i64,
    ) -> Result<Cart, CartsServiceError> {
        let lines = self.items_repository.get_cart_items(tx, cart).await?;

        Ok(Cart::from_items(lines.into_iter().map(CartLineItem::from)))
    }

    async fn fetch(&self, user: UserId) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;
        let loaded = self.load(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(loaded)
    }

    async fn add(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        validate_product(product)?;
        validate_insert_quantity(quantity)?;

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self
            .items_repository
            .add_cart_item(&mut tx, cart, product, quantity)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        let loaded = self.load(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(loaded)
    }

    async fn set(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        validate_product(product)?;

        let Some(quantity) = line_quantity(quantity)? else {
            return self.remove(user, product).await;
        };

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self
            .items_repository
            .set_cart_item_quantity(&mut tx, cart, product, quantity)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        let loaded = self.load(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(loaded)
    }

    async fn remove(&self, user: UserId, product: ProductId) -> Result<Cart, CartsServiceError> {
        validate_product(product)?;

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart, product)
            .await?;

        if rows_affected > 0 {
            self.carts_repository.touch_cart(&mut tx, cart).await?;
        }

        let loaded = self.load(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(loaded)
    }

    async fn clear_all(&self, user: UserId) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.get_or_create_cart(&mut tx, user).await?;

        let rows_affected = self.items_repository.clear_cart_items(&mut tx, cart).await?;

        debug!(%user, rows_affected, "cleared cart");

        self.carts_repository.touch_cart(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(Cart::default())
    }
}

fn into_server_error(user: UserId, error: CartsServiceError) -> ServerCartError {
    if matches!(
        error,
        CartsServiceError::Sql(_) | CartsServiceError::InvalidQuantity(_)
    ) {
        error!(%user, %error, "cart storage failure");
    }

    error.into()
}

#[async_trait]
impl ServerCartStore for PgCartsService {
    async fn get_or_create(&self, user: UserId) -> Result<Cart, ServerCartError> {
        self.fetch(user)
            .await
            .map_err(|error| into_server_error(user, error))
    }

    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Cart, ServerCartError> {
        self.add(user, product, quantity)
            .await
            .map_err(|error| into_server_error(user, error))
    }

    async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, ServerCartError> {
        self.set(user, product, quantity)
            .await
            .map_err(|error| into_server_error(user, error))
    }

    async fn remove_item(&self, user: UserId, product: ProductId) -> Result<Cart, ServerCartError> {
        self.remove(user, product)
            .await
            .map_err(|error| into_server_error(user, error))
    }

    async fn clear(&self, user: UserId) -> Result<Cart, ServerCartError> {
        self.clear_all(user)
            .await
            .map_err(|error| into_server_error(user, error))
    }
}
