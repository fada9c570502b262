//! Server-side cart persistence.
//!
//! [`ServerCartStore`] is the contract the reconciliation controller talks to while a user is
//! signed in. Every call is individually atomic and returns the refreshed, fully hydrated cart.

mod http;
mod memory;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{cart::Cart, products::ProductId, users::UserId};

pub use http::{HttpServerCartStore, HttpStoreConfig};
pub use memory::InMemoryServerCartStore;

/// Server cart errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerCartError {
    /// The caller has no valid session for this cart.
    #[error("not authenticated")]
    Unauthenticated,

    /// The request was rejected before touching the cart.
    #[error("invalid cart request: {0}")]
    Validation(String),

    /// The product is not in the cart, or does not exist.
    #[error("cart item not found")]
    NotFound,

    /// The resource is referenced elsewhere and cannot be changed.
    #[error("resource in use")]
    Conflict,

    /// The store did not answer within the configured bound.
    #[error("cart request timed out")]
    Timeout,

    /// Network or storage failure.
    #[error("cart store unavailable: {0}")]
    Unavailable(String),
}

impl ServerCartError {
    /// Whether the failure is transient: the request may succeed if issued again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unavailable(_))
    }
}

/// Authoritative cart storage for authenticated users, one cart per user.
#[automock]
#[async_trait]
pub trait ServerCartStore: Send + Sync {
    /// Return the user's cart, creating an empty one on first access.
    async fn get_or_create(&self, user: UserId) -> Result<Cart, ServerCartError>;

    /// Add `quantity` units of a product, incrementing an existing line or inserting one.
    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Cart, ServerCartError>;

    /// Set the absolute quantity of an existing line; `quantity <= 0` deletes the line.
    async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, ServerCartError>;

    /// Delete a product's line; a missing line is not an error.
    async fn remove_item(&self, user: UserId, product: ProductId) -> Result<Cart, ServerCartError>;

    /// Delete every line, keeping the cart itself.
    async fn clear(&self, user: UserId) -> Result<Cart, ServerCartError>;
}

/// Reject requests that must never reach a store.
///
/// # Errors
///
/// Returns [`ServerCartError::Validation`] for a non-positive product id.
pub fn validate_product(product: ProductId) -> Result<(), ServerCartError> {
    if product.is_valid() {
        Ok(())
    } else {
        Err(ServerCartError::Validation(format!(
            "product id must be positive, got {product}"
        )))
    }
}

/// Reject an insert with no units.
///
/// # Errors
///
/// Returns [`ServerCartError::Validation`] for a zero quantity.
pub fn validate_insert_quantity(quantity: u32) -> Result<(), ServerCartError> {
    if quantity == 0 {
        Err(ServerCartError::Validation(
            "quantity must be at least 1".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Convert an update quantity to a line quantity, `None` meaning "delete the line".
///
/// # Errors
///
/// Returns [`ServerCartError::Validation`] when the quantity does not fit a line.
pub fn line_quantity(quantity: i64) -> Result<Option<u32>, ServerCartError> {
    if quantity <= 0 {
        return Ok(None);
    }

    u32::try_from(quantity)
        .map(Some)
        .map_err(|error| ServerCartError::Validation(format!("quantity {quantity}: {error}")))
}
