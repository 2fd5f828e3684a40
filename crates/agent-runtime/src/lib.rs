//! # agent-runtime
//!
//! Runtime bindings for the science agent.
//!
//! ## Providers
//!
//! - **Groq** (default): hosted Llama models over the OpenAI-compatible API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{AgentSettings, research_agent_cell};
//!
//! dotenvy::dotenv().ok();
//! let cell = research_agent_cell(AgentSettings::from_env());
//! let handle = cell.get_or_init().await?;
//! let result = agent_core::orchestrator::query(&handle, "What is 2+2?").await?;
//! ```

pub mod bootstrap;
pub mod groq;

pub use bootstrap::{AgentSettings, build_research_agent, research_agent_cell};
pub use groq::{GroqConfig, GroqProvider};

// Re-export core types for convenience
pub use agent_core::{AgentCell, AgentHandle, InitError, OrchestratorError};
