//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use tracing::debug;
use trolley::users::UserId;

const USER_ID_DEPOT_KEY: &str = "user_id";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// Record the user the bearer token belongs to.
    fn insert_user_id(&mut self, user: UserId);

    fn user_id_or_401(&self) -> Result<UserId, StatusError>;

    /// The authenticated user, provided it is the owner named by the `{user}` path segment.
    fn owner_or_403(&self, user: i64) -> Result<UserId, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_user_id(&mut self, user: UserId) {
        self.insert(USER_ID_DEPOT_KEY, user);
    }

    fn user_id_or_401(&self) -> Result<UserId, StatusError> {
        self.get::<UserId>(USER_ID_DEPOT_KEY)
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn owner_or_403(&self, user: i64) -> Result<UserId, StatusError> {
        let authenticated = self.user_id_or_401()?;

        if authenticated.get() == user {
            Ok(authenticated)
        } else {
            debug!(%authenticated, requested = user, "rejected access to another user's cart");

            Err(StatusError::forbidden().brief("Token does not belong to this user"))
        }
    }
}
