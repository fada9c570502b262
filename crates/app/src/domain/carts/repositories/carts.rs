//! Carts Repository

use sqlx::{Postgres, Transaction, query, query_scalar};
use trolley::users::UserId;

const GET_OR_CREATE_CART_SQL: &str = include_str!("../sql/get_or_create_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Return the id of the user's cart, creating the cart on first access.
    pub(crate) async fn get_or_create_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<i64, sqlx::Error> {
        let cart = query_scalar::<Postgres, i64>(GET_OR_CREATE_CART_SQL)
            .bind(user.get())
            .fetch_optional(&mut **tx)
            .await?;

        match cart {
            Some(cart) => Ok(cart),
            // A concurrent first access created the row after this statement's snapshot.
            None => {
                query_scalar::<Postgres, i64>(GET_OR_CREATE_CART_SQL)
                    .bind(user.get())
                    .fetch_one(&mut **tx)
                    .await
            }
        }
    }

    pub(crate) async fn touch_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: i64,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_CART_SQL).bind(cart).execute(&mut **tx).await?;

        Ok(())
    }
}
