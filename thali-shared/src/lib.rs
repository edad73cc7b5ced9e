//! # Thali Shared Library
//!
//! Domain types, persistence and authentication primitives used by the
//! Thali food-ordering API.
//!
//! ## Module Organization
//!
//! - `models`: Database models (principals, orders, products)
//! - `auth`: Password hashing, tokens, credential store, token gate
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Thali shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
