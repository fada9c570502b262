//! Carts

pub mod errors;
mod records;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
