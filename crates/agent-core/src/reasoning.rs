//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! The agent observes, thinks, acts (via tools), and responds.

use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::{ReasoningEngine, RunTrace};
use crate::error::{AgentError, InitError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant.

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate.";

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt, describing tools inline when the
    /// provider cannot receive them natively
    fn build_system_prompt(&self, native_tools: bool) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if !native_tools && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the loop until the model answers without requesting a tool
    pub async fn run_conversation(&self, conversation: Conversation) -> Result<RunTrace> {
        let native_tools = self.provider.info().supports_tools;
        let mut messages = conversation.into_messages();

        // Ensure system prompt is set
        if messages.first().map(|m| m.role) != Some(Role::System) {
            messages.insert(0, Message::system(self.build_system_prompt(native_tools)));
        }

        let schemas = if native_tools {
            self.tools.schemas()
        } else {
            Vec::new()
        };

        for iteration in 1..=self.config.max_iterations {
            let completion = self
                .provider
                .complete(&messages, &schemas, &self.config.generation)
                .await?;
            if let Some(usage) = &completion.usage {
                tracing::debug!(iteration, total_tokens = usage.total_tokens, "Completion received");
            }

            // Providers with native calling report every call structurally;
            // their text is the answer even when it quotes tool JSON
            let mut calls = completion.tool_calls;
            if calls.is_empty() && !native_tools {
                calls.extend(parse_tool_call(&completion.content));
            }
            for call in &mut calls {
                if call.id.is_none() {
                    call.id = Some(uuid::Uuid::new_v4().to_string());
                }
            }

            messages.push(
                Message::assistant(completion.content).with_tool_calls(calls.clone()),
            );

            // No tool call - this is the final response
            if calls.is_empty() {
                return Ok(RunTrace::new(messages));
            }

            for call in &calls {
                tracing::debug!(tool = %call.name, iteration, "Executing tool");

                let result = self.execute_tool(call).await;
                if !result.success {
                    tracing::warn!(tool = %call.name, output = %result.output, "Tool call failed");
                }

                messages.push(
                    Message::tool(format_tool_result(&result), call.id.clone())
                        .with_name(&call.name),
                );
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Execute a tool call; failures become a failed result the model can read
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => ToolResult {
                name: call.name.clone(),
                id: call.id.clone(),
                success: false,
                output: format!("Error: {e}"),
            },
        }
    }

}

#[async_trait]
impl ReasoningEngine for Agent {
    async fn run(&self, conversation: Conversation) -> Result<RunTrace> {
        self.run_conversation(conversation).await
    }

    fn probe(&self) -> std::result::Result<(), InitError> {
        if self.config.system_prompt.trim().is_empty() {
            return Err(InitError::integration("system prompt", "instruction is empty"));
        }
        if self.tools.is_empty() {
            return Err(InitError::integration("tool set", "no tools are bound"));
        }
        if self.config.max_iterations == 0 {
            return Err(InitError::integration(
                "reasoning loop",
                "max_iterations must be at least 1",
            ));
        }

        let info = self.provider.info();
        if self.config.generation.model.trim().is_empty() {
            return Err(InitError::integration(
                format!("provider {}", info.name),
                "no model configured",
            ));
        }

        tracing::debug!(
            provider = %info.name,
            model = %self.config.generation.model,
            native_tools = info.supports_tools,
            tools = self.tools.len(),
            "Agent binding validated"
        );
        Ok(())
    }
}

/// Parse a fenced ```tool JSON block, or failing that an inline JSON object
/// carrying a "tool" key
fn parse_tool_call(content: &str) -> Option<ToolCall> {
    const TOOL_START: &str = "```tool";
    const TOOL_END: &str = "```";

    if let Some(start_idx) = content.find(TOOL_START) {
        let after_marker = &content[start_idx + TOOL_START.len()..];
        if let Some(end_idx) = after_marker.find(TOOL_END) {
            let json_str = after_marker[..end_idx].trim();
            if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                return Some(call);
            }
        }
    }

    parse_inline_tool_call(content)
}

fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        result.output.clone()
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
