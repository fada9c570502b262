//! Trolley
//!
//! Trolley is a dual-mode shopping cart engine. Anonymous visitors keep their cart in local
//! storage, authenticated users keep it on the server, and the [`controller::CartController`]
//! moves the local cart into the server cart exactly once when a session logs in.

pub mod cart;
pub mod controller;
pub mod items;
pub mod local;
pub mod payload;
pub mod pricing;
pub mod products;
pub mod server;
pub mod users;
