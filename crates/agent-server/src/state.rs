//! Application State

use std::sync::Arc;

use agent_core::{AgentCell, AgentHandle, OrchestratorError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Lazily built research agent; every request goes through the same cell
    pub cell: Arc<AgentCell>,
}

impl AppState {
    pub const fn new(cell: Arc<AgentCell>) -> Self {
        Self { cell }
    }

    /// The published agent handle, building it on first use
    pub async fn agent(&self) -> Result<Arc<AgentHandle>, OrchestratorError> {
        self.cell.get_or_init().await.map_err(OrchestratorError::from)
    }
}
