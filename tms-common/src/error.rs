//! Common error types for TMS

use thiserror::Error;

/// Common result type for TMS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the TMS crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration file
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Highlight span that cannot be laid over the text
    #[error("Invalid span [{start}, {end}): {reason}")]
    InvalidSpan {
        start: usize,
        end: usize,
        reason: &'static str,
    },
}
