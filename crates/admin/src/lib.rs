//! Vendora Admin library.
//!
//! Everything except the binary entry point lives here, so the router and
//! management handlers are reachable from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod routes;
pub mod state;
