//! Cache store error types

use thiserror::Error;

/// Cache store operation errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Value too large: {size} bytes (max: {max} bytes)")]
    ValueTooLarge { size: usize, max: usize },

    #[error("Operation not supported by cache backend: {0}")]
    Unsupported(&'static str),

    #[error("Cache error: {0}")]
    Other(String),
}

impl CacheError {
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Self::Deserialization(err.to_string())
        } else {
            Self::Serialization(err.to_string())
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = CacheError::Connection("refused".to_string());
        assert!(err.to_string().contains("connection"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_value_too_large_error_display() {
        let err = CacheError::ValueTooLarge {
            size: 2_000_000,
            max: 1_048_576,
        };
        let msg = err.to_string();
        assert!(msg.contains("too large"));
        assert!(msg.contains("2000000"));
        assert!(msg.contains("1048576"));
    }

    #[test]
    fn test_unsupported_predicate() {
        let err = CacheError::Unsupported("compare_and_swap");
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("compare_and_swap"));
        assert!(!CacheError::Other("x".into()).is_unsupported());
    }

    #[test]
    fn test_from_json_syntax_error_is_deserialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = CacheError::from(json_err);
        assert!(matches!(err, CacheError::Deserialization(_)));
    }
}
