//! # research-tools
//!
//! The scientific research tool set bound to the agent.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  web_search   DuckDuckGo HTML results     (best-effort)  │
//! │  wikipedia    search API + page summary   (best-effort)  │
//! │  arxiv        Atom export API             (best-effort)  │
//! │  calculator   local expression evaluator                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The three network tools never fail agent construction: an unreachable
//! backend surfaces as a failed tool result the model can read and route
//! around.

use std::time::Duration;

use serde::Serialize;

use agent_core::ToolRegistry;

pub mod error;
pub mod svckit;

pub use error::{Result, ToolError};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{ArxivTool, CalculatorTool, WebSearchTool, WikipediaTool};
}

/// System prompt for the research agent
pub const RESEARCH_PROMPT: &str = "You are a professional scientist and experienced researcher with access to multiple \
scientific research tools. Your mission is to provide accurate, well-founded, and evidence-based answers.

You have access to the following tools:
- Web Search: For up-to-date information, news, and recent events
- Wikipedia: For detailed encyclopedic information and general concepts
- ArXiv: For scientific articles, academic papers, and scientific literature
- Calculator: For complex mathematical and scientific calculations

Whenever possible, use multiple sources to validate information. \
Prioritize scientific articles from ArXiv for technical and scientific questions. \
Use the calculator for any necessary calculations. \
Be precise, cite your sources when relevant, and explain your reasoning.";

/// Public description of one bound tool
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Name the model calls the tool by
    #[serde(skip)]
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub description: &'static str,
    /// Display label used by health reporting and the CLI banner
    #[serde(skip)]
    pub label: &'static str,
}

static CATALOG: [ToolDescriptor; 4] = [
    ToolDescriptor {
        id: svckit::web_search::TOOL_NAME,
        name: "Web Search",
        provider: "DuckDuckGo",
        description: "Searches for up-to-date information on the internet. Use for news, recent events, and general information.",
        label: "Web Search (DuckDuckGo)",
    },
    ToolDescriptor {
        id: svckit::wikipedia::TOOL_NAME,
        name: "Wikipedia",
        provider: "Wikipedia API",
        description: "Searches for detailed and encyclopedic information. Ideal for concepts, biographies, historical events, and in-depth explanations.",
        label: "Wikipedia",
    },
    ToolDescriptor {
        id: svckit::arxiv::TOOL_NAME,
        name: "ArXiv",
        provider: "ArXiv API",
        description: "Searches and retrieves scientific articles. Use to find academic papers, recent research, and scientific literature.",
        label: "ArXiv",
    },
    ToolDescriptor {
        id: svckit::calculator::TOOL_NAME,
        name: "Scientific Calculator",
        provider: "Custom",
        description: "Performs complex mathematical calculations including trigonometric, logarithmic, and exponential functions.",
        label: "Scientific Calculator",
    },
];

/// Static catalog of the tools `research_toolset` binds
pub fn catalog() -> &'static [ToolDescriptor] {
    &CATALOG
}

/// Display labels for every catalogued tool
pub fn tool_labels() -> Vec<String> {
    CATALOG.iter().map(|t| t.label.to_string()).collect()
}

/// Knobs for the network-backed tools
#[derive(Clone, Debug)]
pub struct ToolSetConfig {
    pub http_timeout: Duration,
    pub search_results: usize,
    pub top_k: usize,
}

impl Default for ToolSetConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(20),
            search_results: 5,
            top_k: 3,
        }
    }
}

/// Build the registry holding all four research tools
pub fn research_toolset(config: &ToolSetConfig) -> ToolRegistry {
    let client = svckit::http_client(config.http_timeout);

    let mut registry = ToolRegistry::new();
    registry.register(tools::WebSearchTool::new(client.clone()).with_max_results(config.search_results));
    registry.register(tools::WikipediaTool::new(client.clone()).with_top_k(config.top_k));
    registry.register(tools::ArxivTool::new(client).with_top_k(config.top_k));
    registry.register(tools::CalculatorTool);

    tracing::debug!(tools = ?registry.names(), "Research tool set ready");
    registry
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use agent_core::{
        AgentBuilder, AgentError, AgentHandle, Completion, GenerationOptions, LlmProvider,
        Message, ProviderInfo, ToolCall, ToolSchema,
    };

    use super::*;

    struct ScriptedProvider {
        script: Mutex<VecDeque<Completion>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "scripted".into(),
                model: "stub".into(),
                supports_tools: true,
            }
        }

        async fn complete(
            &self,
            messages: &[Message],
            _tools: &[ToolSchema],
            _options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            // Echo the calculator output back as the final answer
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(completion) => Ok(completion),
                None => {
                    let tool_output = messages
                        .iter()
                        .rev()
                        .find(|m| m.name.as_deref() == Some("calculator"))
                        .map(|m| m.content.clone())
                        .ok_or_else(|| AgentError::Provider("no tool output".into()))?;
                    Ok(Completion::text(format!("2 + 2 = {tool_output}"), "stub"))
                }
            }
        }
    }

    #[test]
    fn test_catalog_matches_toolset() {
        let registry = research_toolset(&ToolSetConfig::default());
        let mut ids: Vec<&str> = catalog().iter().map(|t| t.id).collect();
        ids.sort_unstable();
        assert_eq!(registry.names(), ids);
        assert_eq!(tool_labels()[0], "Web Search (DuckDuckGo)");
    }

    #[test]
    fn test_catalog_serialization() {
        let json = serde_json::to_value(&catalog()[3]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Scientific Calculator",
                "provider": "Custom",
                "description": catalog()[3].description,
            })
        );
    }

    #[tokio::test]
    async fn test_calculator_question_end_to_end() {
        let provider = Arc::new(ScriptedProvider {
            script: Mutex::new(VecDeque::from([Completion {
                tool_calls: vec![
                    ToolCall::new("calculator")
                        .with_argument("expression", serde_json::json!("2+2")),
                ],
                ..Completion::text("", "stub")
            }])),
        });
        let agent = AgentBuilder::new()
            .provider(provider)
            .tool(tools::CalculatorTool)
            .system_prompt(RESEARCH_PROMPT)
            .build()
            .unwrap();
        let handle = AgentHandle::new(Arc::new(agent), vec!["calculator".into()]);

        let result = agent_core::orchestrator::query(&handle, "What is 2+2?")
            .await
            .unwrap();

        assert_eq!(result.tools_used, Some(vec!["calculator".to_string()]));
        assert!(result.answer.contains('4'));
        assert_eq!(result.question, "What is 2+2?");
    }
}
