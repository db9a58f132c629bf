//! Logger initialization for the command-line entry point.
//!
//! The library itself only talks to the `log` facade; binaries pick the
//! backend. This wires up `env_logger`.

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "offprint=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);
        // try_init: a test harness or host may already own the global logger
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
