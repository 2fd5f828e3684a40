//! UI Components

use leptos::prelude::*;

use crate::api::ChatMessage;

/// One rendered chat entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: usize,
    pub message: ChatMessage,
    pub tools: Vec<String>,
    /// Local error notice; never replayed to the server
    pub error: bool,
}

/// Conversation to send: every non-error entry, in order
pub fn replay(entries: &[ChatEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .filter(|e| !e.error)
        .map(|e| e.message.clone())
        .collect()
}

/// Message bubble component
#[component]
pub fn MessageBubble(entry: ChatEntry) -> impl IntoView {
    let role = if entry.error {
        "error".to_string()
    } else {
        entry.message.role.clone()
    };
    let class = format!("message message-{role}");
    let badges = (!entry.tools.is_empty()).then(|| {
        view! {
            <div class="tools">
                {entry
                    .tools
                    .into_iter()
                    .map(|t| view! { <span class="badge">{format!("🛠 {t}")}</span> })
                    .collect_view()}
            </div>
        }
    });

    view! {
        <div class=class>
            <span class="role">{role}</span>
            <p class="content">{entry.message.content}</p>
            {badges}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, role: &str, error: bool) -> ChatEntry {
        ChatEntry {
            id,
            message: ChatMessage {
                role: role.into(),
                content: format!("m{id}"),
            },
            tools: Vec::new(),
            error,
        }
    }

    #[test]
    fn test_replay_skips_errors_and_keeps_order() {
        let entries = vec![
            entry(0, "user", false),
            entry(1, "assistant", false),
            entry(2, "user", false),
            entry(3, "assistant", true),
            entry(4, "user", false),
        ];
        let sent = replay(&entries);
        let contents: Vec<&str> = sent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m4"]);
    }
}
