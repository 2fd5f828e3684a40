//! Query Orchestrator
//!
//! Turns a single question or a caller-owned chat history into an engine
//! invocation, then normalizes the run into an answer plus the distinct tools
//! used. Stateless: every call replays the full conversation it is given.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;
use crate::handle::AgentHandle;
use crate::message::{Conversation, Message, Role};

/// A role/content pair as exchanged with callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant.as_str(), content)
    }
}

/// Outcome of the single-question path
#[derive(Clone, Debug)]
pub struct QueryResult {
    pub answer: String,
    pub question: String,
    /// Distinct tool names, `None` when the engine reported none
    pub tools_used: Option<Vec<String>>,
    /// Wall-clock seconds spent in the orchestration
    pub processing_time: f64,
    /// Every message of the run, for callers that asked for it
    pub history: Vec<Message>,
}

/// Outcome of the multi-turn path
#[derive(Clone, Debug)]
pub struct ChatReply {
    pub message: ChatMessage,
    pub tools_used: Option<Vec<String>>,
}

/// One engine message, classified once at the orchestration boundary
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunMessage {
    /// Ordinary turn with no tool markers
    Plain { role: Role, content: String },
    /// Assistant turn that requested one or more tools
    ToolCall { content: String, names: Vec<String> },
    /// Output of a named tool
    ToolResult { name: String, content: String },
}

impl RunMessage {
    /// Inspect an engine message for tool markers
    #[must_use]
    pub fn classify(message: &Message) -> Self {
        if let Some(name) = message.name.as_deref().filter(|n| !n.is_empty()) {
            return Self::ToolResult {
                name: name.to_string(),
                content: message.content.clone(),
            };
        }
        if !message.tool_calls.is_empty() {
            return Self::ToolCall {
                content: message.content.clone(),
                names: message.tool_calls.iter().map(|c| c.name.clone()).collect(),
            };
        }
        Self::Plain {
            role: message.role,
            content: message.content.clone(),
        }
    }

    /// Text of an assistant turn, if this is one
    #[must_use]
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            Self::Plain {
                role: Role::Assistant,
                content,
            }
            | Self::ToolCall { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Tool names this message marks as used
    #[must_use]
    pub fn tool_names(&self) -> &[String] {
        match self {
            Self::ToolCall { names, .. } => names,
            Self::ToolResult { name, .. } => std::slice::from_ref(name),
            Self::Plain { .. } => &[],
        }
    }
}

/// Distinct tool names across a run; `None` when there are none
#[must_use]
pub fn collect_tools_used(run: &[RunMessage]) -> Option<Vec<String>> {
    let names: BTreeSet<&String> = run.iter().flat_map(RunMessage::tool_names).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.into_iter().cloned().collect())
    }
}

struct Outcome {
    answer: String,
    tools_used: Option<Vec<String>>,
    history: Vec<Message>,
}

/// Answer one question
pub async fn query(handle: &AgentHandle, question: &str) -> Result<QueryResult, OrchestratorError> {
    validate_question(question)?;

    let start = Instant::now();
    let outcome = invoke(handle, vec![Message::user(question)].into()).await?;
    let elapsed = start.elapsed().as_secs_f64();

    tracing::info!(
        elapsed_secs = elapsed,
        tools = ?outcome.tools_used,
        "Query answered"
    );

    Ok(QueryResult {
        answer: outcome.answer,
        question: question.to_string(),
        tools_used: outcome.tools_used,
        processing_time: round_secs(elapsed),
        history: outcome.history,
    })
}

/// Continue a caller-owned conversation
pub async fn chat(
    handle: &AgentHandle,
    messages: &[ChatMessage],
) -> Result<ChatReply, OrchestratorError> {
    let conversation = to_conversation(messages)?;

    let start = Instant::now();
    let outcome = invoke(handle, conversation).await?;

    tracing::info!(
        turns = messages.len(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        tools = ?outcome.tools_used,
        "Chat answered"
    );

    Ok(ChatReply {
        message: ChatMessage::assistant(outcome.answer),
        tools_used: outcome.tools_used,
    })
}

/// Reject a blank question before any engine work
pub fn validate_question(question: &str) -> Result<(), OrchestratorError> {
    if question.trim().is_empty() {
        return Err(OrchestratorError::Validation(
            "question must not be empty".into(),
        ));
    }
    Ok(())
}

/// Convert inbound chat messages, rejecting empty input and unknown roles
pub fn to_conversation(messages: &[ChatMessage]) -> Result<Conversation, OrchestratorError> {
    if messages.is_empty() {
        return Err(OrchestratorError::Validation(
            "messages must not be empty".into(),
        ));
    }

    messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Role::from_inbound(&m.role)
                .map(|role| Message::new(role, m.content.clone()))
                .ok_or_else(|| {
                    OrchestratorError::Validation(format!(
                        "messages[{i}]: unknown role '{}' (expected user, assistant or system)",
                        m.role
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Conversation::from)
}

async fn invoke(
    handle: &AgentHandle,
    conversation: Conversation,
) -> Result<Outcome, OrchestratorError> {
    let budget = handle.request_timeout();

    let trace = match tokio::time::timeout(budget, handle.engine().run(conversation)).await {
        Ok(Ok(trace)) => trace,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Agent run failed");
            return Err(OrchestratorError::Execution(format!(
                "Error processing request: {e}"
            )));
        }
        Err(_) => {
            tracing::error!(budget_secs = budget.as_secs_f64(), "Agent run timed out");
            return Err(OrchestratorError::Timeout(budget));
        }
    };

    let run: Vec<RunMessage> = trace.messages.iter().map(RunMessage::classify).collect();

    let answer = run
        .iter()
        .rev()
        .find_map(RunMessage::assistant_text)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            OrchestratorError::Execution("Agent failed to generate a response".into())
        })?
        .to_string();

    Ok(Outcome {
        answer,
        tools_used: collect_tools_used(&run),
        history: trace.messages,
    })
}

fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::engine::{ReasoningEngine, RunTrace};
    use crate::error::{AgentError, Result as AgentResult};
    use crate::tool::ToolCall;

    enum Behavior {
        /// Answer with a calculator round trip
        Calculate,
        /// Reply with a fixed text after a delay
        Reply(&'static str, Duration),
        Fail,
        /// Only tool calls, never a final text
        Silent,
    }

    struct StubEngine {
        behavior: Behavior,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl StubEngine {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn invocations(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReasoningEngine for StubEngine {
        async fn run(&self, conversation: Conversation) -> AgentResult<RunTrace> {
            self.calls.lock().unwrap().push(conversation.messages().to_vec());
            let mut messages = conversation.into_messages();

            match &self.behavior {
                Behavior::Calculate => {
                    messages.push(
                        Message::assistant("").with_tool_calls(vec![
                            ToolCall::new("calculator")
                                .with_argument("expression", serde_json::json!("2+2")),
                        ]),
                    );
                    messages.push(Message::tool("4", None).with_name("calculator"));
                    messages.push(Message::assistant("2 + 2 = 4"));
                }
                Behavior::Reply(text, delay) => {
                    tokio::time::sleep(*delay).await;
                    messages.push(Message::assistant(*text));
                }
                Behavior::Fail => return Err(AgentError::RateLimited("429 from provider".into())),
                Behavior::Silent => {
                    messages.push(
                        Message::assistant("  ").with_tool_calls(vec![ToolCall::new("arxiv")]),
                    );
                }
            }
            Ok(RunTrace::new(messages))
        }
    }

    fn handle(engine: Arc<StubEngine>) -> AgentHandle {
        AgentHandle::new(engine, vec!["calculator".into()])
    }

    #[tokio::test]
    async fn test_query_reports_calculator() {
        let engine = StubEngine::new(Behavior::Calculate);
        let result = query(&handle(engine.clone()), "What is 2+2?").await.unwrap();

        assert!(result.answer.contains('4'));
        assert_eq!(result.question, "What is 2+2?");
        assert_eq!(result.tools_used, Some(vec!["calculator".to_string()]));
        assert!(result.processing_time >= 0.0);

        let invocations = engine.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].len(), 1);
        assert_eq!(invocations[0][0].role, Role::User);
        assert_eq!(invocations[0][0].content, "What is 2+2?");
    }

    #[tokio::test]
    async fn test_blank_question_never_reaches_engine() {
        let engine = StubEngine::new(Behavior::Calculate);
        let h = handle(engine.clone());

        for question in ["", "   ", "\n\t"] {
            let err = query(&h, question).await.unwrap_err();
            assert!(matches!(err, OrchestratorError::Validation(_)));
        }
        assert!(engine.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_no_tools_reported_as_none() {
        let engine = StubEngine::new(Behavior::Reply("Hello there", Duration::ZERO));
        let result = query(&handle(engine), "Hi").await.unwrap();
        assert_eq!(result.answer, "Hello there");
        assert!(result.tools_used.is_none());
    }

    #[tokio::test]
    async fn test_processing_time_tracks_wall_clock() {
        let engine = StubEngine::new(Behavior::Reply("done", Duration::from_millis(120)));
        let result = query(&handle(engine), "slow?").await.unwrap();
        assert!(result.processing_time >= 0.1, "{}", result.processing_time);
    }

    #[tokio::test]
    async fn test_engine_failure_is_execution_error() {
        let engine = StubEngine::new(Behavior::Fail);
        let err = query(&handle(engine), "anything").await.unwrap_err();
        match err {
            OrchestratorError::Execution(msg) => assert!(msg.contains("429 from provider")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_engine_failure_is_execution_error() {
        let engine = StubEngine::new(Behavior::Fail);
        let err = chat(&handle(engine.clone()), &[ChatMessage::new("user", "anything")])
            .await
            .unwrap_err();
        match err {
            OrchestratorError::Execution(msg) => assert!(msg.contains("429 from provider")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_final_answer_is_not_success() {
        let engine = StubEngine::new(Behavior::Silent);
        let err = query(&handle(engine), "papers?").await.unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::Execution("Agent failed to generate a response".into())
        );
    }

    #[tokio::test]
    async fn test_timeout_returns_no_partial_answer() {
        let engine = StubEngine::new(Behavior::Reply("too late", Duration::from_secs(5)));
        let h = handle(engine).with_timeout(Duration::from_millis(50));
        let err = query(&h, "slow").await.unwrap_err();
        assert_eq!(err, OrchestratorError::Timeout(Duration::from_millis(50)));
        assert_eq!(err.code(), "TIMEOUT_ERROR");
        assert_eq!(err.to_string(), "Agent did not finish within 0.05 seconds");
    }

    #[tokio::test]
    async fn test_chat_preserves_order_and_roles() {
        let engine = StubEngine::new(Behavior::Reply("D", Duration::ZERO));
        let messages = vec![
            ChatMessage::new("user", "A"),
            ChatMessage::new("assistant", "B"),
            ChatMessage::new("user", "C"),
        ];

        let reply = chat(&handle(engine.clone()), &messages).await.unwrap();
        assert_eq!(reply.message, ChatMessage::assistant("D"));
        assert!(reply.tools_used.is_none());

        let invocations = engine.invocations();
        assert_eq!(invocations.len(), 1);
        let sent: Vec<(Role, &str)> = invocations[0]
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            sent,
            vec![(Role::User, "A"), (Role::Assistant, "B"), (Role::User, "C")]
        );
    }

    #[tokio::test]
    async fn test_chat_rejects_unknown_role_and_empty_history() {
        let engine = StubEngine::new(Behavior::Reply("never", Duration::ZERO));
        let h = handle(engine.clone());

        let err = chat(&h, &[ChatMessage::new("moderator", "hi")])
            .await
            .unwrap_err();
        assert!(matches!(&err, OrchestratorError::Validation(msg) if msg.contains("moderator")));

        let err = chat(&h, &[]).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Validation(_)));

        assert!(engine.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_chat_passes_system_messages_through() {
        let engine = StubEngine::new(Behavior::Calculate);
        let messages = vec![
            ChatMessage::new("system", "Answer in French."),
            ChatMessage::new("user", "2+2?"),
        ];
        let reply = chat(&handle(engine.clone()), &messages).await.unwrap();
        assert_eq!(reply.tools_used, Some(vec!["calculator".to_string()]));
        assert_eq!(engine.invocations()[0][0].role, Role::System);
    }

    #[test]
    fn test_classify_and_dedup() {
        let run: Vec<RunMessage> = [
            Message::user("q"),
            Message::assistant("").with_tool_calls(vec![
                ToolCall::new("wikipedia"),
                ToolCall::new("arxiv"),
            ]),
            Message::tool("...", None).with_name("wikipedia"),
            Message::tool("...", None).with_name("arxiv"),
            Message::assistant("").with_tool_calls(vec![ToolCall::new("wikipedia")]),
            Message::assistant("final"),
        ]
        .iter()
        .map(RunMessage::classify)
        .collect();

        assert!(matches!(run[0], RunMessage::Plain { role: Role::User, .. }));
        assert!(matches!(&run[1], RunMessage::ToolCall { names, .. } if names.len() == 2));
        assert!(matches!(&run[2], RunMessage::ToolResult { name, .. } if name == "wikipedia"));
        assert_eq!(run[5].assistant_text(), Some("final"));

        let mut tools = collect_tools_used(&run).unwrap();
        tools.sort();
        assert_eq!(tools, vec!["arxiv".to_string(), "wikipedia".to_string()]);
    }

    #[test]
    fn test_round_secs() {
        assert!((round_secs(1.23456) - 1.23).abs() < f64::EPSILON);
        assert!(round_secs(0.0).abs() < f64::EPSILON);
    }
}
