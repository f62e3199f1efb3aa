//! Subcommand implementations.
//!
//! Each command prints its result to stdout; diagnostics go through
//! `tracing` to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
