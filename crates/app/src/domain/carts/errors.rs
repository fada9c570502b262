//! Carts service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use trolley::server::ServerCartError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// No line for the product, or the product does not exist.
    #[error("cart item not found")]
    NotFound,

    /// The cart owner does not exist.
    #[error("user not found")]
    UnknownUser,

    #[error("invalid cart request: {0}")]
    Validation(String),

    #[error("invalid data")]
    InvalidData,

    #[error("stored quantity out of range")]
    InvalidQuantity(#[from] TryFromIntError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::UnknownUser,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}

impl From<ServerCartError> for CartsServiceError {
    fn from(error: ServerCartError) -> Self {
        match error {
            ServerCartError::Validation(reason) => Self::Validation(reason),
            ServerCartError::NotFound => Self::NotFound,
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<CartsServiceError> for ServerCartError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::NotFound | CartsServiceError::UnknownUser => Self::NotFound,
            CartsServiceError::Validation(reason) => Self::Validation(reason),
            CartsServiceError::InvalidData => Self::Validation(error.to_string()),
            CartsServiceError::InvalidQuantity(_) | CartsServiceError::Sql(_) => {
                Self::Unavailable(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            CartsServiceError::from(Error::RowNotFound),
            CartsServiceError::NotFound
        ));
    }

    #[test]
    fn test_server_error_mapping() {
        assert_eq!(
            ServerCartError::from(CartsServiceError::UnknownUser),
            ServerCartError::NotFound
        );
        assert_eq!(
            ServerCartError::from(CartsServiceError::Validation("quantity".to_string())),
            ServerCartError::Validation("quantity".to_string())
        );
        assert!(matches!(
            ServerCartError::from(CartsServiceError::Sql(Error::PoolTimedOut)),
            ServerCartError::Unavailable(_)
        ));
    }
}
