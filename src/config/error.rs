//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnvValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// A setting failed validation.
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },
}
