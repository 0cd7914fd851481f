//! Telemetry initialization

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Where and how log lines are written.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
    /// Write to stderr instead of stdout, keeping console output readable.
    pub stderr: bool,
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { default_filter: "info".to_string(), stderr: true, with_target: true }
    }
}

impl TelemetryConfig {
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Initialize console logging with the default configuration.
///
/// # Example
/// ```
/// use homescout_telemetry::init_telemetry;
/// init_telemetry("homescout").expect("Failed to initialize telemetry");
/// ```
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_with_config(service_name, TelemetryConfig::default())
}

/// Initialize console logging. Only the first call installs a subscriber.
pub fn init_with_config(
    service_name: &str,
    config: TelemetryConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_filter)?,
    };

    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        if config.stderr {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(config.with_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
                .init();
        }

        tracing::info!(service.name = service_name, "Telemetry initialized");
    });

    Ok(())
}
