//! Error types

use thiserror::Error;

/// Main error type for Review Hours
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
