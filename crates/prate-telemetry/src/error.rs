//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the subscriber failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The logging configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::InvalidConfig("level".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: level");
    }
}
