//! Error types for gigwatch
//!
//! Four failure classes reach the user:
//! - Configuration: AI credential missing; blocks every AI-dependent operation
//! - Upstream: network, API or parse failure from the AI gateway; state is kept
//! - CapabilityUnavailable: e.g. a folder that cannot be scanned
//! - Input errors (NotFound, InvalidInput) from user commands
//!
//! An empty result is never an error.

use thiserror::Error;

use crate::services::GatewayError;

/// gigwatch error type
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Missing or invalid configuration (e.g. no AI API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// AI gateway failure
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Environment cannot provide the requested capability
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Referenced band or concert does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// gigwatch-common error
    #[error(transparent)]
    Common(gigwatch_common::Error),
}

impl TrackerError {
    /// True for failures that only a configuration change can fix
    pub fn is_configuration(&self) -> bool {
        matches!(self, TrackerError::Configuration(_))
    }
}

impl From<gigwatch_common::Error> for TrackerError {
    fn from(err: gigwatch_common::Error) -> Self {
        match err {
            gigwatch_common::Error::Config(msg) => TrackerError::Configuration(msg),
            gigwatch_common::Error::NotFound(msg) => TrackerError::NotFound(msg),
            gigwatch_common::Error::InvalidInput(msg) => TrackerError::InvalidInput(msg),
            other => TrackerError::Common(other),
        }
    }
}

impl From<GatewayError> for TrackerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::MissingApiKey => TrackerError::Configuration(err.to_string()),
            other => TrackerError::Upstream(other.to_string()),
        }
    }
}

/// Result type for gigwatch operations
pub type TrackerResult<T> = Result<T, TrackerError>;
