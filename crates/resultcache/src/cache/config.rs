//! Cache configuration types

use std::str::FromStr;
use std::time::Duration;

/// Default maximum value size: 1MB
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1_048_576;

/// Default number of optimistic merge attempts before a blind write
pub const DEFAULT_MAX_CAS_ATTEMPTS: u32 = 3;

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Noop,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::Noop,
        })
    }
}

/// Cache configuration
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// Cache backend type
    pub backend: CacheBackend,
    /// TTL applied by the backend when a save carries no lifetime
    pub default_ttl: Option<Duration>,
    /// Maximum entries for in-memory cache
    pub max_entries: Option<usize>,
    /// Maximum size of a single cached value in bytes (default: 1MB)
    pub max_value_size: usize,
    /// Read-merge-swap attempts per save on backends with compare-and-swap
    pub max_cas_attempts: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: false,
            backend: CacheBackend::Noop,
            default_ttl: None,
            max_entries: Some(10000),
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS,
        }
    }
}
