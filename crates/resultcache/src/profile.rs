//! Query cache profile and two-level key generation.
//!
//! The inner ("real") key identifies one result set: SQL text, bound
//! parameters and a fingerprint of the connection. The outer key names the
//! cache slot it is stored in; by default each inner key gets its own slot
//! (the SHA-256 of the inner key), while an explicit `cache_key` lets many
//! parameter bindings share one slot.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::value::Value;

/// Outer and inner key of one cached result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKeys {
    /// Cache slot key.
    pub outer: String,
    /// Result-set key inside the slot.
    pub inner: String,
}

impl CacheKeys {
    pub fn new(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            outer: outer.into(),
            inner: inner.into(),
        }
    }
}

/// Caching policy attached to one query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCacheProfile {
    /// Entry lifetime in seconds; `0` leaves expiry to the store.
    pub lifetime: u32,
    /// Fixed outer key shared by every binding of the query.
    pub cache_key: Option<String>,
}

impl QueryCacheProfile {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lifetime: 0,
            cache_key: None,
        }
    }

    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: u32) -> Self {
        self.lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Derive the outer and inner key for `sql` bound to `params`.
    #[must_use]
    pub fn generate_cache_keys(
        &self,
        sql: &str,
        params: &[Value],
        connection_params: &BTreeMap<String, String>,
    ) -> CacheKeys {
        // A Vec<Value> always serializes.
        let params_json = serde_json::to_string(params).unwrap_or_default();
        let inner = format!(
            "query={sql}&params={params_json}&connectionParams={}",
            fingerprint(connection_params)
        );
        let outer = self
            .cache_key
            .clone()
            .unwrap_or_else(|| sha256_hex(inner.as_bytes()));

        CacheKeys { outer, inner }
    }
}

/// SHA-256 of the connection parameters as a JSON object in key order.
fn fingerprint(connection_params: &BTreeMap<String, String>) -> String {
    // A string map always serializes.
    let json = serde_json::to_string(connection_params).unwrap_or_default();
    sha256_hex(json.as_bytes())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
