//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in state, login/logout and session restore
//! - `cart` - Persisted cart with write-through saves and the logout rule
//! - `catalog` - Turns catalog records into cart-ready products
//! - `checkout` - Contact form, order composition and submission

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
