//! Reasoning Engine seam
//!
//! The orchestrator only ever talks to a [`ReasoningEngine`]. The bundled
//! ReAct [`Agent`](crate::reasoning::Agent) is one binding; anything else that
//! can turn a conversation into a final answer plus a message trace can be
//! dropped in without touching the orchestration path.

use async_trait::async_trait;

use crate::error::{InitError, Result};
use crate::message::{Conversation, Message};

/// Every message produced during one engine run, oldest first.
///
/// Includes the input conversation as the engine saw it (system prompt
/// included), followed by assistant turns and tool results.
#[derive(Clone, Debug, Default)]
pub struct RunTrace {
    pub messages: Vec<Message>,
}

impl RunTrace {
    #[must_use]
    pub const fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Anything that can answer a conversation, possibly by calling tools
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Run the conversation to completion
    async fn run(&self, conversation: Conversation) -> Result<RunTrace>;

    /// Check that the binding is complete and callable.
    ///
    /// Called once before the handle is published; must not touch the network.
    fn probe(&self) -> std::result::Result<(), InitError> {
        Ok(())
    }
}
