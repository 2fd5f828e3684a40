//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors raised inside the reasoning engine and its collaborators
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Maximum iterations reached in reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Parse error (e.g., malformed provider output)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Failure while constructing the process-wide agent handle.
///
/// `Clone` so every caller waiting on the same single-flight construction
/// observes the same failure value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Missing or invalid configuration (e.g., absent API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine binding did not produce a usable handle
    #[error("Integration error in {binding}: {message}")]
    Integration { binding: String, message: String },
}

impl InitError {
    pub fn integration(binding: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Integration {
            binding: binding.into(),
            message: message.into(),
        }
    }
}

impl From<AgentError> for InitError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Config(msg) => Self::Configuration(msg),
            other => Self::integration("agent", other.to_string()),
        }
    }
}

/// Errors surfaced by the query orchestrator to interface adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Missing credential or configuration; the agent cannot be built
    #[error("{0}")]
    Configuration(String),

    /// Malformed or empty caller input; never retried
    #[error("{0}")]
    Validation(String),

    /// The reasoning engine failed mid-run
    #[error("{0}")]
    Execution(String),

    /// The request exceeded its time budget
    #[error("Agent did not finish within {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    /// Incompatible engine binding detected during initialization
    #[error("{0}")]
    Integration(String),
}

impl OrchestratorError {
    /// Short machine-readable code for logs and clients
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Execution(_) => "EXECUTION_ERROR",
            Self::Timeout(_) => "TIMEOUT_ERROR",
            Self::Integration(_) => "INTEGRATION_ERROR",
        }
    }
}

impl From<InitError> for OrchestratorError {
    fn from(err: InitError) -> Self {
        match err {
            InitError::Configuration(msg) => {
                Self::Configuration(format!("Failed to initialize agent: {msg}"))
            }
            err @ InitError::Integration { .. } => {
                Self::Integration(format!("Failed to initialize agent: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_configuration() {
        let err: InitError = AgentError::Config("GROQ_API_KEY not found".into()).into();
        assert_eq!(err, InitError::Configuration("GROQ_API_KEY not found".into()));

        let err: OrchestratorError = err.into();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_integration_error_names_binding() {
        let err = InitError::integration("provider", "tool calling unsupported");
        assert_eq!(
            err.to_string(),
            "Integration error in provider: tool calling unsupported"
        );
    }

    #[test]
    fn test_timeout_reports_fractional_budget() {
        let err = OrchestratorError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Agent did not finish within 0.25 seconds");
        assert_eq!(
            OrchestratorError::Timeout(Duration::from_secs(60)).to_string(),
            "Agent did not finish within 60 seconds"
        );
    }
}
