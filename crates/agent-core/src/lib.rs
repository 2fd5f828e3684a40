//! # agent-core
//!
//! Core agent logic: provider-agnostic LLM abstraction, tool system, the
//! ReAct reasoning loop, and the query orchestration path that interface
//! adapters call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Interface adapters (HTTP API, web UI, CLI)                        │
//! └───────────────┬──────────────────────────────────────────────────┘
//!                 │ query / chat
//! ┌───────────────▼─────────────┐     ┌────────────────────────────┐
//! │      Query Orchestrator     │────▶│ AgentHandle (AgentCell,    │
//! │ validate · time · normalize │     │ single-flight, read-only)  │
//! └───────────────┬─────────────┘     └────────────────────────────┘
//!                 │ ReasoningEngine::run
//! ┌───────────────▼──────────────────────────────────────────────────┐
//! │ Agent: Reasoning Loop ── ToolRegistry ── LlmProvider (Strategy)   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ReasoningEngine` trait isolates the orchestrator from whichever loop
//! implementation is bound; the `LlmProvider` trait does the same for the
//! model backend.

pub mod engine;
pub mod error;
pub mod handle;
pub mod message;
pub mod orchestrator;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use engine::{ReasoningEngine, RunTrace};
pub use error::{AgentError, InitError, OrchestratorError, Result};
pub use handle::{AgentCell, AgentHandle};
pub use message::{Conversation, Message, Role};
pub use orchestrator::{ChatMessage, ChatReply, QueryResult, RunMessage};
pub use provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
