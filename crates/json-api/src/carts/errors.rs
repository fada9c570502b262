//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};
use trolley::server::ServerCartError;

pub(crate) fn into_status_error(error: ServerCartError) -> StatusError {
    match error {
        ServerCartError::Validation(reason) => StatusError::bad_request().brief(reason),
        ServerCartError::Unauthenticated => StatusError::unauthorized(),
        ServerCartError::NotFound => StatusError::not_found().brief("Cart item not found"),
        ServerCartError::Conflict => StatusError::conflict(),
        ServerCartError::Timeout => {
            warn!("cart store timed out");

            StatusError::internal_server_error()
        }
        ServerCartError::Unavailable(source) => {
            error!("cart store unavailable: {source}");

            StatusError::internal_server_error()
        }
    }
}
