//! Wikipedia Tool
//!
//! Finds the best-matching articles through the search API and returns their
//! lead-section summaries. Best-effort.

use async_trait::async_trait;
use serde::Deserialize;

use agent_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::error::{Result, ToolError};
use crate::svckit::truncate_chars;

pub const TOOL_NAME: &str = "wikipedia";

const API_URL: &str = "https://en.wikipedia.org/w/api.php";
const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const MAX_OUTPUT_CHARS: usize = 4000;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract: String,
}

/// Tool for encyclopedic lookups
pub struct WikipediaTool {
    client: reqwest::Client,
    top_k: usize,
}

impl WikipediaTool {
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client, top_k: 3 }
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k.to_string();
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::Upstream {
                service: "Wikipedia",
                status: response.status().as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .query
            .map(|q| q.search.into_iter().map(|e| e.title).collect())
            .unwrap_or_default())
    }

    async fn summary(&self, title: &str) -> Result<PageSummary> {
        let url = format!(
            "{SUMMARY_URL}/{}",
            urlencoding::encode(&title.replace(' ', "_"))
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::Upstream {
                service: "Wikipedia",
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn lookup(&self, query: &str) -> Result<Vec<PageSummary>> {
        let mut pages = Vec::new();
        for title in self.search_titles(query).await? {
            match self.summary(&title).await {
                Ok(page) if !page.extract.trim().is_empty() => pages.push(page),
                Ok(_) => {}
                Err(e) => tracing::debug!(%title, error = %e, "Skipping Wikipedia page"),
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Searches for detailed and encyclopedic information on Wikipedia. \
                Ideal for concepts, biographies, historical events, and in-depth explanations."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "query",
                "Topic to look up on Wikipedia",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();
        if query.is_empty() {
            return Ok(ToolResult::failure(TOOL_NAME, "Wikipedia query is empty"));
        }

        match self.lookup(query).await {
            Ok(pages) if pages.is_empty() => Ok(ToolResult::success(
                TOOL_NAME,
                "No good Wikipedia Search Result was found",
            )),
            Ok(pages) => Ok(ToolResult::success(TOOL_NAME, format_pages(&pages))),
            Err(e) => {
                tracing::warn!(error = %e, "Wikipedia lookup failed");
                Ok(ToolResult::failure(
                    TOOL_NAME,
                    format!("Wikipedia lookup failed: {e}"),
                ))
            }
        }
    }
}

fn format_pages(pages: &[PageSummary]) -> String {
    let text = pages
        .iter()
        .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&text, MAX_OUTPUT_CHARS)
}
