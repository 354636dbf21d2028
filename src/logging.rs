//! Logging setup for sshlink.
//!
//! Diagnostics go through `tracing` to stderr so they never interleave
//! with the interactive prompts and the final ssh session on stdout. The
//! default level is quiet; `RUST_LOG` overrides it.

use std::io;

use tracing_subscriber::EnvFilter;

/// Default log level when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error, off).
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` takes precedence over the configured level. Must be called
/// once, before any negotiation step runs.
pub fn init(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    }
}
