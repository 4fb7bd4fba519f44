//! Race weather gateway library.
//!
//! Exposes the internal modules so integration tests can drive the router
//! against a fake upstream.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod races;
pub mod rate_limit;
pub mod state;
pub mod upstream;
pub mod validate;
