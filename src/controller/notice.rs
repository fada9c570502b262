//! Cart view and user-facing notices.

use crate::{cart::Cart, products::ProductId};

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    /// The canonical cart for the active mode
    pub cart: Cart,

    /// Whether the server cart is in use; for messaging only
    pub is_authenticated: bool,
}

/// Transient, non-blocking notices for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartNotice {
    /// A server cart operation failed; the cart shown is the last known-good one.
    SyncFailed {
        /// Human-readable failure reason
        reason: String,
    },

    /// Some guest cart lines could not be moved into the account cart.
    MigrationIncomplete {
        /// Products whose lines failed to migrate
        failed: Vec<ProductId>,
    },

    /// The server no longer accepts the session; the guest cart is in use again.
    SessionExpired,
}
