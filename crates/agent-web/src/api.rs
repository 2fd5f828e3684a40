//! API Client

use serde::{Deserialize, Serialize};

/// Chat message as exchanged with `/api/chat`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Reply from `/api/chat`
#[derive(Clone, Debug, Deserialize)]
pub struct ChatReply {
    pub message: ChatMessage,
    #[serde(default)]
    pub tools_used: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

fn api_url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:7860".into());
    format!("{origin}{path}")
}

/// Send the full conversation; the server keeps no session state
pub async fn send_chat(history: &[ChatMessage]) -> Result<ChatReply, String> {
    let response = reqwest::Client::new()
        .post(api_url("/api/chat"))
        .json(&ChatRequest { messages: history })
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(error_detail(&text).unwrap_or_else(|| format!("Request failed ({status})")))
    }
}

fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body).ok().map(|e| e.detail)
}
