//! Hardalum storefront client library.
//!
//! Everything a shopper does against the Hardalum storefront API lives here:
//! browsing the catalog, keeping a durable cart, signing in, checking out,
//! and contacting the shop. The `hardalum` binary in the CLI crate is a thin
//! shell over [`state::Storefront`].
//!
//! # Modules
//!
//! - [`cart`] - cart state, totals, and background addition reports
//! - [`catalog`] - product listing with a bundled fallback catalog
//! - [`checkout`] - order placement for carts and buy-now purchases
//! - [`auth`] - persisted sign-in session
//! - [`api`] - typed client for the storefront HTTP API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod contact;
pub mod error;
pub mod state;
pub mod storage;

pub use error::{Result, StorefrontError};
pub use state::Storefront;
