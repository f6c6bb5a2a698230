//! Unified error handling.
//!
//! Every fallible [`Storefront`](crate::state::Storefront) operation returns
//! `Result<T, AppError>`. Binaries render the error and exit non-zero; no
//! variant is fatal to the session itself.

use thiserror::Error;

use heavyline_core::CartError;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart change was refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A REST call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout was refused or the order could not be placed.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Whether the error means the API no longer accepts the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) => e.is_unauthorized(),
            Self::Auth(AuthError::NotAuthenticated) => true,
            Self::Catalog(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
