//! TOML configuration file loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::Settings;
use crate::cache::CacheBackend;
use crate::error::Error;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./resultcache.toml",
    "~/.config/resultcache/config.toml",
    "/etc/resultcache/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load settings from a TOML file on top of `settings`
pub fn load_from_file(path: &Path, settings: Settings) -> Result<Settings, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(settings, file_config)
}

fn apply_file_config(mut settings: Settings, config: FileConfig) -> Result<Settings, Error> {
    if let Some(cache) = config.cache {
        if let Some(enabled) = cache.enabled {
            settings.cache.enabled = enabled;
        }

        if let Some(backend) = cache.backend {
            settings.cache.backend = parse_backend(&backend)?;
        }

        if let Some(secs) = cache.default_ttl_secs {
            settings.cache.default_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(max) = cache.max_entries {
            settings.cache.max_entries = (max > 0).then_some(max);
        }

        if let Some(size) = cache.max_value_size {
            settings.cache.max_value_size = size;
        }

        if let Some(attempts) = cache.max_cas_attempts {
            settings.cache.max_cas_attempts = attempts;
        }
    }

    if let Some(log) = config.logging {
        if let Some(level) = log.log_level {
            settings.log.log_level = level;
        }

        if let Some(json) = log.json_logs {
            settings.log.json_logs = json;
        }
    }

    Ok(settings)
}

/// Backend names are checked strictly in files; unknown values are typos.
fn parse_backend(name: &str) -> Result<CacheBackend, Error> {
    match name.to_lowercase().as_str() {
        "memory" | "mem" => Ok(CacheBackend::Memory),
        "noop" | "none" => Ok(CacheBackend::Noop),
        other => Err(Error::Config(format!("Unknown cache backend: {other}"))),
    }
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    cache: Option<CacheFileConfig>,
    logging: Option<LoggingFileConfig>,
}

#[derive(Debug, Deserialize)]
struct CacheFileConfig {
    enabled: Option<bool>,
    backend: Option<String>,
    default_ttl_secs: Option<u64>,
    max_entries: Option<usize>,
    max_value_size: Option<usize>,
    max_cas_attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LoggingFileConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}
