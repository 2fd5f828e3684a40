//! Web Search Tool
//!
//! Searches DuckDuckGo's HTML endpoint for up-to-date information.
//! Best-effort: network failures come back as a failed tool result.

use async_trait::async_trait;

use agent_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::error::{Result, ToolError};
use crate::svckit::{html_decode, strip_tags};

pub const TOOL_NAME: &str = "web_search";

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// One search hit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Tool for searching the web through DuckDuckGo
pub struct WebSearchTool {
    client: reqwest::Client,
    max_results: usize,
}

impl WebSearchTool {
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_results: 5,
        }
    }

    #[must_use]
    pub const fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::Upstream {
                service: "DuckDuckGo",
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        Ok(parse_results(&html, self.max_results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Searches for up-to-date information on the internet using DuckDuckGo. \
                Use for news, recent events, and general information."
                .into(),
            parameters: vec![ParameterSchema::required_string("query", "Search query")],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();
        if query.is_empty() {
            return Ok(ToolResult::failure(TOOL_NAME, "Search query is empty"));
        }

        match self.search(query).await {
            Ok(hits) if hits.is_empty() => Ok(ToolResult::success(
                TOOL_NAME,
                "No good DuckDuckGo Search Result was found",
            )),
            Ok(hits) => Ok(ToolResult::success(TOOL_NAME, format_hits(&hits))),
            Err(e) => {
                tracing::warn!(error = %e, "Web search failed");
                Ok(ToolResult::failure(TOOL_NAME, format!("Search failed: {e}")))
            }
        }
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            if hit.snippet.is_empty() {
                format!("{}. {}\n   {}", i + 1, hit.title, hit.url)
            } else {
                format!("{}. {}\n   {}\n   {}", i + 1, hit.title, hit.url, hit.snippet)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract results from the DuckDuckGo HTML page.
///
/// Titles sit in `<a class="result__a" href="...">`, snippets in the following
/// `result__snippet` element.
fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    html.split("class=\"result__a\"")
        .skip(1)
        .filter_map(|chunk| {
            let href = chunk.split("href=\"").nth(1)?.split('"').next()?;
            let title = chunk.split_once('>')?.1.split("</a>").next()?;
            let snippet = chunk
                .split("result__snippet")
                .nth(1)
                .and_then(|s| s.split_once('>'))
                .and_then(|(_, rest)| rest.split("</a>").next())
                .unwrap_or_default();

            let url = resolve_redirect(&html_decode(href));
            if !url.starts_with("http") {
                return None;
            }

            Some(SearchHit {
                title: html_decode(&strip_tags(title)).trim().to_string(),
                url,
                snippet: html_decode(&strip_tags(snippet)).trim().to_string(),
            })
        })
        .filter(|hit| !hit.title.is_empty())
        .take(max_results)
        .collect()
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`
fn resolve_redirect(href: &str) -> String {
    href.split_once("uddg=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map_or_else(|| href.to_string(), |decoded| decoded.into_owned())
}
