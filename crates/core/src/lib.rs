//! AgriMarket Core - Shared domain types.
//!
//! This crate provides the common types used across all AgriMarket
//! components:
//! - `storefront` - Server-rendered marketplace front-end
//! - `cli` - Command-line tools for chain status, seeding, and pinning
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no chain access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, token amounts,
//!   products, and transaction records
//! - [`cart`] - The session-local shopping cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::Cart;
pub use types::*;
