//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > defaults

mod env;
mod file;

use std::path::Path;

use crate::cache::CacheConfig;
use crate::error::Error;

/// Logging setup consumed by [`crate::observability::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub cache: CacheConfig,
    pub log: LogConfig,
}

/// Load settings with precedence: env > file > defaults
pub fn load_settings() -> Result<Settings, Error> {
    let mut settings = Settings::default();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        settings = file::load_from_file(&path, settings)?;
    }

    env::load_from_env(settings)
}

/// Load settings from a specific file path, then apply environment overrides
pub fn load_settings_from_path(path: &Path) -> Result<Settings, Error> {
    let settings = file::load_from_file(path, Settings::default())?;
    env::load_from_env(settings)
}
