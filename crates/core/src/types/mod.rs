//! Core types for Hardalum.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderItem};
pub use price::{Price, PriceError};
pub use product::{Category, Product, Variant};
pub use status::OrderStatus;
pub use user::User;
