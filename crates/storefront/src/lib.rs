//! Vendora Storefront library.
//!
//! Everything except the binary entry point lives here, so the router,
//! handlers, and cart logic are reachable from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod state;
