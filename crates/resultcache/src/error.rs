//! Error types for the caching cursor and its ambient setup.
//!
//! Cursor errors follow the propagation policy of the decorator:
//! - `InvalidShape`: caller asked for a row projection that does not exist
//! - `Capability`: caller invoked an operation the wrapped source cannot serve
//! - `NoData`: a projection found nothing to return for a fetched row
//! - `Source`: failure reported by the underlying cursor, passed through as-is
//!
//! Cache store failures never show up here; they are swallowed at the save
//! boundary (see [`crate::writer`]).

use std::error::Error as StdError;

use thiserror::Error;

/// Error surfaced by [`crate::CachingCursor`] and the cursor contracts.
#[derive(Debug, Error)]
pub enum CursorError {
    /// Unrecognized row shape tag.
    #[error("invalid fetch shape: {0}")]
    InvalidShape(String),

    /// Operation requires a capability the source does not provide.
    #[error("capability not supported: {0}")]
    Capability(String),

    /// Fetched row had no value for the requested projection.
    #[error("no data: {0}")]
    NoData(String),

    /// Failure raised by the underlying cursor.
    #[error("cursor error: {0}")]
    Source(#[source] Box<dyn StdError + Send + Sync>),
}

impl CursorError {
    #[must_use]
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    #[must_use]
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    #[must_use]
    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    /// Wrap a driver error.
    #[must_use]
    pub fn from_source<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Source(Box::new(err))
    }

    #[must_use]
    pub const fn is_invalid_shape(&self) -> bool {
        matches!(self, Self::InvalidShape(_))
    }

    #[must_use]
    pub const fn is_capability(&self) -> bool {
        matches!(self, Self::Capability(_))
    }

    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }

    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// Result type for cursor operations.
pub type Result<T> = std::result::Result<T, CursorError>;

/// Error raised while loading settings or bootstrapping logging.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
