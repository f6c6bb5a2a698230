//! Heavyline Core - Shared types library.
//!
//! This crate provides the types used across all Heavyline components:
//! - `storefront` - Client-side cart, auth lifecycle and checkout
//! - `cli` - Command-line driver for the storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and wire enums
//! - [`cart`] - The cart and its merge-by-identity mutation rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartLine, Product, Quantity, QuantityUpdate};
pub use types::*;
