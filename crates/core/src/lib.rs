//! Hardalum Core - Shared domain types.
//!
//! This crate provides the domain types used across the Hardalum workspace:
//! - `storefront` - Client library (cart, catalog, checkout, auth)
//! - `cli` - Terminal front-end for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, emails, products, users, and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
