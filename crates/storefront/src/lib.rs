//! Heavyline storefront library.
//!
//! The client side of the industrial-vehicle storefront: a cart persisted in a
//! local key-value store, the auth session it is tied to, and the checkout
//! flow that turns it into an order request on the REST API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use config::StorefrontConfig;
pub use error::{AppError, Result};
pub use state::Storefront;
