//! REST client for the Heavyline catalog and order API.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheap to clone (shared `Arc` inner)
//! - Bearer token cached in memory and attached to every request once set
//! - Typed wire records in [`types`], converted to domain types at the edge

pub mod client;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected our credentials or the session expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error response.
    #[error("API error: {status} - {detail}")]
    Api { status: u16, detail: String },

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this error means the current session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
