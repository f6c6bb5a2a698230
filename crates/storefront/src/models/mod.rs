//! Domain models shared across storefront services.

pub mod session;

pub use session::AuthSession;
