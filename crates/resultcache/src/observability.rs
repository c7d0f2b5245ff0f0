//! Logging bootstrap for binaries and tests that embed the cache.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the application.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;
use crate::error::Error;

/// Install a global `EnvFilter` + fmt subscriber.
///
/// `RUST_LOG` wins over [`LogConfig::log_level`]. Fails if a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), Error> {
    let filter = build_filter(config)?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter, Error> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {e}", config.log_level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_from_config() {
        let config = LogConfig {
            log_level: "resultcache=debug,warn".to_string(),
            json_logs: false,
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        let first = init_logging(&config);
        let second = init_logging(&config);

        // Another test may have installed the subscriber first
        assert!(first.is_ok() || first.unwrap_err().is_config());
        assert!(second.unwrap_err().is_config());
    }
}
