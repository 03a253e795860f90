//! Error types for the bookstore domain

use thiserror::Error;

/// Result type alias using the domain Error
pub type Result<T> = std::result::Result<T, Error>;

/// Domain error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown HTTP status name: {0}")]
    UnknownStatusName(String),

    #[error("Unknown entity kind: {0} (expected 'book' or 'author')")]
    UnknownEntityKind(String),
}
