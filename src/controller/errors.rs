//! Controller errors.

use thiserror::Error;

use crate::{products::ProductId, server::ServerCartError};

/// Errors reported to callers of the cart controller.
///
/// Transient failures have already been broadcast as a [`super::CartNotice`] and the cart view
/// left at its last known-good value by the time the caller sees them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// The request was rejected before any store was touched.
    #[error("invalid cart request: {0}")]
    Validation(String),

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),

    /// The server store failed; the cart view was kept at its last known-good value.
    #[error("cart could not be synchronised")]
    Transient(#[source] ServerCartError),
}
