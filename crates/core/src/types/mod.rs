//! Core types for AgriMarket.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod id;
pub mod product;
pub mod record;
pub mod status;

pub use amount::{AmountError, TokenAmount};
pub use id::*;
pub use product::Product;
pub use record::TransactionRecord;
pub use status::TxStatus;
