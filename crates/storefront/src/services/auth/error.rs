//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] heavyline_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// The auth API failed for a reason other than bad credentials.
    #[error("auth API error: {0}")]
    Api(#[from] ApiError),

    /// The token could not be persisted or removed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
