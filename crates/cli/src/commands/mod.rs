//! Command implementations.
//!
//! Commands write their results to stdout; diagnostics go through `tracing`
//! to stderr.

pub mod account;
pub mod cart;
pub mod checkout;

use std::io::{self, Write};

use heavyline_core::ProductId;
use heavyline_storefront::AppError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] io::Error),

    /// A vehicle ID argument did not parse.
    #[error("Invalid vehicle ID: {0}")]
    InvalidId(String),
}

fn parse_id(raw: &str) -> Result<ProductId, CliError> {
    raw.parse().map_err(|_| CliError::InvalidId(raw.to_owned()))
}

/// Write one line to stdout.
fn say(line: impl std::fmt::Display) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}
