//! Service Kit - Research Tools
//!
//! Tools that implement `agent_core::Tool` for the research agent, plus the
//! small text helpers the HTTP-backed ones share.

use std::time::Duration;

pub mod arxiv;
pub mod calculator;
pub mod web_search;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use calculator::CalculatorTool;
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

const USER_AGENT: &str = concat!("science-agent/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by the network tools
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Decode the handful of entities the search backends emit.
pub(crate) fn html_decode(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

pub(crate) fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Cut to `max` characters on a char boundary, marking the cut.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
