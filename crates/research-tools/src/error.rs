//! Error Types for Research Tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Upstream { service: &'static str, status: u16 },

    #[error("Unexpected response from {service}: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl ToolError {
    pub(crate) fn calc(message: impl Into<String>) -> Self {
        Self::Calculation(message.into())
    }
}
