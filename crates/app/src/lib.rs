//! Server-side persistence for Trolley carts: `PostgreSQL` cart store, catalog and API tokens.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
