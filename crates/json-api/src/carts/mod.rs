//! Carts
//!
//! Per-user server carts. Every route is scoped to `/users/{user}/cart` and only the owner of the
//! bearer token may touch it.

pub(crate) mod errors;
mod handlers;
pub(crate) mod items;
pub(crate) mod models;

pub(crate) use handlers::*;
