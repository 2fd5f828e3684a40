//! ArXiv Tool
//!
//! Queries the arXiv Atom API for scientific articles. Best-effort.

use async_trait::async_trait;

use agent_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::error::{Result, ToolError};
use crate::svckit::{html_decode, truncate_chars};

pub const TOOL_NAME: &str = "arxiv";

const API_URL: &str = "https://export.arxiv.org/api/query";
const MAX_OUTPUT_CHARS: usize = 4000;

/// One paper from the Atom feed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub published: String,
    pub summary: String,
    pub url: String,
}

/// Tool for academic paper lookup
pub struct ArxivTool {
    client: reqwest::Client,
    top_k: usize,
}

impl ArxivTool {
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client, top_k: 3 }
    }

    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    async fn search(&self, query: &str) -> Result<Vec<Paper>> {
        let search_query = format!("all:{query}");
        let max_results = self.top_k.to_string();
        let response = self
            .client
            .get(API_URL)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::Upstream {
                service: "arXiv",
                status: response.status().as_u16(),
            });
        }

        let xml = response.text().await?;
        if !xml.contains("<feed") {
            return Err(ToolError::Parse {
                service: "arXiv",
                message: "response is not an Atom feed".into(),
            });
        }
        Ok(parse_feed(&xml))
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Searches and retrieves scientific articles from ArXiv. Use to find \
                academic papers, recent research, and scientific literature on any topic."
                .into(),
            parameters: vec![ParameterSchema::required_string(
                "query",
                "Search query for academic papers",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();
        if query.is_empty() {
            return Ok(ToolResult::failure(TOOL_NAME, "ArXiv query is empty"));
        }

        match self.search(query).await {
            Ok(papers) if papers.is_empty() => Ok(ToolResult::success(
                TOOL_NAME,
                "No good Arxiv Result was found",
            )),
            Ok(papers) => Ok(ToolResult::success(TOOL_NAME, format_papers(&papers))),
            Err(e) => {
                tracing::warn!(error = %e, "ArXiv search failed");
                Ok(ToolResult::failure(TOOL_NAME, format!("ArXiv search failed: {e}")))
            }
        }
    }
}

fn format_papers(papers: &[Paper]) -> String {
    let text = papers
        .iter()
        .map(|p| {
            format!(
                "Published: {}\nTitle: {}\nAuthors: {}\nLink: {}\nSummary: {}",
                p.published,
                p.title,
                p.authors.join(", "),
                p.url,
                p.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_chars(&text, MAX_OUTPUT_CHARS)
}

fn parse_feed(xml: &str) -> Vec<Paper> {
    xml.split("<entry>")
        .skip(1)
        .filter_map(|entry| {
            let entry = entry.split("</entry>").next()?;
            let title = element_text(entry, "title")?;

            Some(Paper {
                title,
                authors: entry
                    .split("<author>")
                    .skip(1)
                    .filter_map(|block| element_text(block, "name"))
                    .collect(),
                published: element_text(entry, "published")
                    .map(|d| d.chars().take(10).collect())
                    .unwrap_or_default(),
                summary: element_text(entry, "summary").unwrap_or_default(),
                url: element_text(entry, "id").unwrap_or_default(),
            })
        })
        .collect()
}

/// Text of the first `<tag ...>...</tag>` element, whitespace collapsed
fn element_text(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = xml.find(&open)?;
    let after_open = &xml[start..];
    let content_start = after_open.find('>')? + 1;
    let content = &after_open[content_start..];
    let end = content.find(&close)?;

    let text = html_decode(&content[..end])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:quantum</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <published>2024-01-02T18:00:00Z</published>
    <title>Quantum Error Correction
      at Scale</title>
    <summary>  We study surface codes &amp; more.
    </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <published>2024-01-03T18:00:00Z</published>
    <title>Second Paper</title>
    <summary>Short.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let papers = parse_feed(FEED);
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Quantum Error Correction at Scale");
        assert_eq!(papers[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(papers[0].published, "2024-01-02");
        assert_eq!(papers[0].summary, "We study surface codes & more.");
        assert_eq!(papers[0].url, "http://arxiv.org/abs/2401.00001v1");
        assert_eq!(papers[1].authors, vec!["Grace Hopper"]);
    }

    #[test]
    fn test_empty_feed() {
        assert!(parse_feed("<feed></feed>").is_empty());
    }

    #[test]
    fn test_format_papers() {
        let text = format_papers(&parse_feed(FEED)[..1]);
        assert!(text.starts_with("Published: 2024-01-02\nTitle: Quantum Error Correction at Scale"));
        assert!(text.contains("Authors: Ada Lovelace, Alan Turing"));
    }

    #[test]
    fn test_element_text() {
        let xml = "<title>Test Paper Title</title><author><name>John Doe</name></author>";
        assert_eq!(element_text(xml, "title").as_deref(), Some("Test Paper Title"));
        assert_eq!(element_text(xml, "name").as_deref(), Some("John Doe"));
        assert!(element_text(xml, "summary").is_none());
    }
}
