//! Agent Initializer
//!
//! Reads the environment, binds the Groq provider, the research tool set and
//! the research prompt into an `AgentHandle`, and wraps construction in a
//! single-flight `AgentCell`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use agent_core::{
    AgentBuilder, AgentCell, AgentHandle, InitError, handle::DEFAULT_REQUEST_TIMEOUT,
    provider::DEFAULT_MODEL,
};
use research_tools::{RESEARCH_PROMPT, ToolSetConfig, research_toolset};

use crate::groq::{DEFAULT_BASE_URL, GroqConfig, GroqProvider, MISSING_KEY};

/// Everything the initializer reads from the environment
#[derive(Clone)]
pub struct AgentSettings {
    /// `GROQ_API_KEY`; absence is reported when the agent is built, not here
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,
    pub request_timeout: Duration,
    pub tools: ToolSetConfig,
}

impl std::fmt::Debug for AgentSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.0,
            max_iterations: 10,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tools: ToolSetConfig::default(),
        }
    }
}

impl AgentSettings {
    /// Read settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    /// Unparseable optional values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs = parse_or(
            &lookup,
            "AGENT_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        );

        Self {
            api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("GROQ_BASE_URL")
                .map_or(defaults.base_url, |u| u.trim_end_matches('/').to_string()),
            model: lookup("GROQ_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            temperature: parse_or(&lookup, "AGENT_TEMPERATURE", defaults.temperature),
            max_iterations: parse_or(&lookup, "AGENT_MAX_ITERATIONS", defaults.max_iterations),
            request_timeout: Duration::from_secs(timeout_secs),
            tools: defaults.tools,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, ?default, "Invalid value, using default");
            default
        }),
    }
}

/// Construct the research agent handle.
///
/// Fails with `InitError::Configuration` when the API key is missing and with
/// `InitError::Integration` when the provider binding cannot be built.
pub fn build_research_agent(settings: &AgentSettings) -> Result<AgentHandle, InitError> {
    let api_key = settings
        .api_key
        .clone()
        .ok_or_else(|| InitError::Configuration(MISSING_KEY.into()))?;

    let groq = GroqConfig {
        base_url: settings.base_url.clone(),
        model: settings.model.clone(),
        ..GroqConfig::new(api_key)
    };
    let provider = GroqProvider::from_config(groq)
        .map_err(|e| InitError::integration("provider Groq", e.to_string()))?;

    let tools = research_toolset(&settings.tools);
    let tool_names: Vec<String> = tools.names().into_iter().map(String::from).collect();

    let agent = AgentBuilder::new()
        .provider(Arc::new(provider))
        .tools(tools)
        .system_prompt(RESEARCH_PROMPT)
        .model(settings.model.clone())
        .temperature(settings.temperature)
        .max_iterations(settings.max_iterations)
        .build()?;

    tracing::info!(
        model = %settings.model,
        tools = tool_names.len(),
        timeout_secs = settings.request_timeout.as_secs(),
        "Research agent bound"
    );

    Ok(AgentHandle::new(Arc::new(agent), tool_names).with_timeout(settings.request_timeout))
}

/// Single-flight cell that lazily builds the research agent from `settings`
pub fn research_agent_cell(settings: AgentSettings) -> AgentCell {
    let settings = Arc::new(settings);
    AgentCell::new(move || {
        let settings = Arc::clone(&settings);
        async move { build_research_agent(&settings) }
    })
}
