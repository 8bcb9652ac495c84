//! Tracing bootstrap for hosts and demos.
//!
//! ```ignore
//! use weft_editor_media::telemetry::{self, TelemetryConfig};
//!
//! telemetry::init(TelemetryConfig::from_env("weft-demo"));
//! tracing::info!("editor ready");
//! ```

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Name attached to the startup log line
    pub service_name: String,
    /// Console log level used when `RUST_LOG` is unset (DEBUG in debug builds)
    pub console_level: Level,
}

impl TelemetryConfig {
    /// Config for `service_name`. `RUST_LOG`, if set, overrides the level at
    /// init time.
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        Self {
            service_name: service_name.into(),
            console_level,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.console_level.as_str().to_lowercase()))
    }
}

/// Install a compact console subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(config: TelemetryConfig) -> bool {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(config.env_filter());

    match tracing_subscriber::registry().with(console_layer).try_init() {
        Ok(()) => {
            tracing::debug!(service = %config.service_name, "telemetry initialized");
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        let config = TelemetryConfig::from_env("weft-test");
        init(config.clone());
        assert!(!init(config));
    }
}
