//! Environment variable loading for configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::Settings;
use crate::cache::CacheBackend;
use crate::error::Error;

/// Environment variable names
mod vars {
    pub const RESULTCACHE_ENABLED: &str = "RESULTCACHE_ENABLED";
    pub const RESULTCACHE_BACKEND: &str = "RESULTCACHE_BACKEND";
    pub const RESULTCACHE_DEFAULT_TTL_SECS: &str = "RESULTCACHE_DEFAULT_TTL_SECS";
    pub const RESULTCACHE_MAX_ENTRIES: &str = "RESULTCACHE_MAX_ENTRIES";
    pub const RESULTCACHE_MAX_VALUE_SIZE: &str = "RESULTCACHE_MAX_VALUE_SIZE";
    pub const RESULTCACHE_CAS_ATTEMPTS: &str = "RESULTCACHE_CAS_ATTEMPTS";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const RESULTCACHE_JSON_LOGS: &str = "RESULTCACHE_JSON_LOGS";
}

/// Apply environment overrides on top of `settings`
pub fn load_from_env(mut settings: Settings) -> Result<Settings, Error> {
    if let Ok(val) = env::var(vars::RESULTCACHE_ENABLED) {
        settings.cache.enabled = parse_bool(&val);
    }

    if let Ok(backend) = env::var(vars::RESULTCACHE_BACKEND) {
        settings.cache.backend = backend.parse::<CacheBackend>().unwrap_or_default();
    }

    if let Some(secs) = parse_var::<u64>(vars::RESULTCACHE_DEFAULT_TTL_SECS)? {
        settings.cache.default_ttl = (secs > 0).then(|| Duration::from_secs(secs));
    }

    if let Some(max) = parse_var::<usize>(vars::RESULTCACHE_MAX_ENTRIES)? {
        settings.cache.max_entries = (max > 0).then_some(max);
    }

    if let Some(size) = parse_var::<usize>(vars::RESULTCACHE_MAX_VALUE_SIZE)? {
        settings.cache.max_value_size = size;
    }

    if let Some(attempts) = parse_var::<u32>(vars::RESULTCACHE_CAS_ATTEMPTS)? {
        settings.cache.max_cas_attempts = attempts;
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        settings.log.log_level = level;
    }

    if let Ok(val) = env::var(vars::RESULTCACHE_JSON_LOGS) {
        settings.log.json_logs = parse_bool(&val);
    }

    Ok(settings)
}

/// Read a numeric variable; unset is `None`, unparsable is a config error.
fn parse_var<T>(name: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env::var(name)
        .ok()
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Invalid {name}: {e}")))
        })
        .transpose()
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
