//! Bootstrap utilities for applications embedding the advice.
//!
//! Shared initialization for hosts that want advice entries on stdout.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::advice::MethodLogger;
use crate::config::{Config, ConfigError, LOG_ENV_VAR};
use crate::sink::TracingSink;

/// Initialize tracing with METHODLOG_LOG environment variable.
///
/// Defaults to "info" level if METHODLOG_LOG is not set, so namespace-rule
/// entries (DEBUG) stay hidden until asked for, e.g. `METHODLOG_LOG=methodlog=debug`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load configuration and build a [`MethodLogger`] writing to `tracing`.
pub fn logger_from_env(path: Option<&str>) -> Result<MethodLogger, ConfigError> {
    let config = Config::load(path)?;
    tracing::info!(
        namespace = %config.advice.namespace,
        enabled = config.advice.enabled,
        "method logging configured"
    );
    Ok(MethodLogger::from_config(Arc::new(TracingSink), &config))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_logger_from_env_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "advice:\n  namespace: payments").unwrap();

        let logger = logger_from_env(file.path().to_str()).unwrap();
        assert_eq!(logger.namespace().prefix(), "payments");
    }

    #[test]
    #[serial]
    fn test_logger_from_env_propagates_load_errors() {
        let result = logger_from_env(Some("/nonexistent/methodlog-bootstrap.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
