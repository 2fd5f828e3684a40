//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use agent_core::{
    ChatMessage, Message, OrchestratorError, Role, ToolCall, orchestrator,
};
use research_tools::ToolDescriptor;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agent_initialized: bool,
    pub available_tools: Vec<String>,
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: &'static [ToolDescriptor],
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub include_history: bool,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub question: String,
    pub tools_used: Option<Vec<String>>,
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

/// One message of the run, as returned when `include_history` is set
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Message> for HistoryEntry {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
            tool_calls: m.tool_calls.clone(),
            name: m.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub tools_used: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Orchestration failure rendered as `{detail}` with a matching status
#[derive(Debug)]
pub struct ApiError(OrchestratorError);

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self.0 {
            OrchestratorError::Validation(_) => StatusCode::BAD_REQUEST,
            OrchestratorError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            OrchestratorError::Execution(_)
            | OrchestratorError::Configuration(_)
            | OrchestratorError::Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(OrchestratorError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::warn!(code = self.0.code(), "Rejected request: {}", self.0);
        }
        (status, Json(ErrorResponse { detail: self.0.to_string() })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// API information
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Scientific Research Agent API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "An autonomous AI agent specialized in scientific research",
        "endpoints": {
            "health": "/health",
            "query": "/api/query",
            "chat": "/api/chat",
            "tools": "/api/tools",
            "ui": "/ui",
        }
    }))
}

/// Health check; attempts initialization so the report reflects real state
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.cell.get_or_init().await {
        Ok(_) => Json(HealthResponse {
            status: "healthy".into(),
            agent_initialized: true,
            available_tools: research_tools::tool_labels(),
        }),
        Err(e) => Json(HealthResponse {
            status: format!("unhealthy: {e}"),
            agent_initialized: false,
            available_tools: Vec::new(),
        }),
    }
}

/// Static tool catalog
pub async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: research_tools::catalog(),
    })
}

/// Single-question endpoint
pub async fn query_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    orchestrator::validate_question(&request.question)?;

    let handle = state.agent().await?;
    let result = orchestrator::query(&handle, &request.question).await?;

    let history = request
        .include_history
        .then(|| result.history.iter().map(HistoryEntry::from).collect());

    Ok(Json(QueryResponse {
        answer: result.answer,
        question: result.question,
        tools_used: result.tools_used,
        processing_time: result.processing_time,
        history,
    }))
}

/// Multi-turn endpoint; the caller owns and replays the history
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    orchestrator::to_conversation(&request.messages)?;

    let handle = state.agent().await?;
    let reply = orchestrator::chat(&handle, &request.messages).await?;

    Ok(Json(ChatResponse {
        message: reply.message,
        tools_used: reply.tools_used,
    }))
}
