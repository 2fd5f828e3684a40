//! Router assembly

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{chat_handler, health_check, list_tools, query_handler, root};
use crate::state::AppState;

/// Build the application router; the web UI is served from `static_dir`
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Client-side routes fall back to the app shell
    let ui = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/query", post(query_handler))
        .route("/api/chat", post(chat_handler))
        .nest_service("/ui", ui)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use agent_core::{
        AgentCell, AgentError, AgentHandle, Conversation, InitError, Message, ReasoningEngine,
        RunTrace, ToolCall,
    };

    use super::*;

    /// Engine that "uses" the calculator and answers 4, or fails on request
    struct CalculatorEngine;

    #[async_trait]
    impl ReasoningEngine for CalculatorEngine {
        async fn run(&self, conversation: Conversation) -> agent_core::Result<RunTrace> {
            let last = conversation.last().map(|m| m.content.clone()).unwrap_or_default();
            if last.contains("explode") {
                return Err(AgentError::Provider("upstream exploded".into()));
            }

            let mut messages = conversation.into_messages();
            messages.push(
                Message::assistant("")
                    .with_tool_calls(vec![ToolCall::new("calculator").with_id("c1")]),
            );
            messages.push(Message::tool("4", Some("c1".into())).with_name("calculator"));
            messages.push(Message::assistant("The answer is 4."));
            Ok(RunTrace::new(messages))
        }
    }

    fn ready_app() -> Router {
        let handle = AgentHandle::new(Arc::new(CalculatorEngine), vec!["calculator".into()]);
        let state = AppState::new(Arc::new(AgentCell::ready(handle)));
        router(state, Path::new("missing-static"))
    }

    fn unconfigured_app() -> Router {
        let cell = AgentCell::new(|| async {
            Err(InitError::Configuration("GROQ_API_KEY not found".into()))
        });
        router(AppState::new(Arc::new(cell)), Path::new("missing-static"))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let (status, body) = send(ready_app(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["query"], "/api/query");
    }

    #[tokio::test]
    async fn test_health_reports_initialized_agent() {
        let (status, body) = send(ready_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["agent_initialized"], true);
        assert_eq!(body["available_tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_health_reports_missing_key_without_crashing() {
        let (status, body) = send(unconfigured_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["status"].as_str().unwrap().starts_with("unhealthy: "));
        assert!(body["status"].as_str().unwrap().contains("GROQ_API_KEY"));
        assert_eq!(body["agent_initialized"], false);
        assert_eq!(body["available_tools"], json!([]));
    }

    #[tokio::test]
    async fn test_tools_catalog() {
        let (status, body) = send(ready_app(), get("/api/tools")).await;
        assert_eq!(status, StatusCode::OK);
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0]["name"], "Web Search");
        assert_eq!(tools[0]["provider"], "DuckDuckGo");
    }

    #[tokio::test]
    async fn test_query_success() {
        let (status, body) = send(
            ready_app(),
            post_json("/api/query", &json!({"question": "What is 2+2?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "The answer is 4.");
        assert_eq!(body["question"], "What is 2+2?");
        assert_eq!(body["tools_used"], json!(["calculator"]));
        assert!(body["processing_time"].is_number());
        assert!(body.get("history").is_none());
    }

    #[tokio::test]
    async fn test_query_with_history() {
        let (_, body) = send(
            ready_app(),
            post_json(
                "/api/query",
                &json!({"question": "What is 2+2?", "include_history": true}),
            ),
        )
        .await;
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0]["role"], "user");
        assert_eq!(history[1]["tool_calls"][0]["name"], "calculator");
        assert_eq!(history[2]["name"], "calculator");
    }

    #[tokio::test]
    async fn test_query_rejects_blank_question() {
        let (status, body) = send(
            unconfigured_app(),
            post_json("/api/query", &json!({"question": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_query_rejects_malformed_body() {
        let (status, body) = send(ready_app(), post_json("/api/query", &json!({"q": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_query_execution_failure_is_500() {
        let (status, body) = send(
            ready_app(),
            post_json("/api/query", &json!({"question": "please explode"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_query_without_key_is_500() {
        let (status, body) = send(
            unconfigured_app(),
            post_json("/api/query", &json!({"question": "What is 2+2?"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_chat_success() {
        let (status, body) = send(
            ready_app(),
            post_json(
                "/api/chat",
                &json!({"messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello"},
                    {"role": "user", "content": "What is 2+2?"}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"]["role"], "assistant");
        assert_eq!(body["message"]["content"], "The answer is 4.");
        assert_eq!(body["tools_used"], json!(["calculator"]));
    }

    #[tokio::test]
    async fn test_chat_rejects_unknown_role() {
        let (status, body) = send(
            ready_app(),
            post_json(
                "/api/chat",
                &json!({"messages": [{"role": "robot", "content": "beep"}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("robot"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_messages() {
        let (status, _) = send(ready_app(), post_json("/api/chat", &json!({"messages": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
