//! Web search agent backed by the Tavily search API

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use kora_llm::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{ToolError, ToolResult};
use crate::http;
use crate::tool::{Tool, ToolKind, ToolRequest};

/// Tavily API base
pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Results per query unless configured otherwise
pub const DEFAULT_MAX_RESULTS: usize = 2;

const SERVICE: &str = "search";

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

/// Web search agent
pub struct SearchTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
}

impl SearchTool {
    /// Agent using `api_key`; without a key every search is unavailable
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http: http::client(timeout),
            base_url: TAVILY_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Point at another API base
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Results per query (at least one)
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    #[instrument(skip(self, query))]
    async fn search_web(&self, query: &str) -> ToolResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::unavailable(SERVICE, "TAVILY_API_KEY is not set"))?;
        if query.trim().is_empty() {
            return Err(ToolError::invalid("search_web", "query is empty"));
        }

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&SearchBody {
                query,
                max_results: self.max_results,
            })
            .send()
            .await?;
        let found: SearchResponse = http::json(SERVICE, response).await?;

        debug!(hits = found.results.len(), "Search completed");
        Ok(format_results(query, &found))
    }
}

fn format_results(query: &str, found: &SearchResponse) -> String {
    if found.results.is_empty() && found.answer.is_none() {
        return format!("No results found for: {query}");
    }

    let mut out = String::new();
    if let Some(answer) = &found.answer {
        let _ = writeln!(out, "Answer: {answer}\n");
    }
    for (i, hit) in found.results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n   {}\n   {}\n", i + 1, hit.title, hit.url, hit.content.trim());
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for SearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Search
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::function(
            "search_web",
            "Search the web for current information, news or facts",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "The search query" }
                },
                "required": ["query"]
            }),
        )]
    }

    async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        match request.function.as_str() {
            "search_web" => {
                let args: SearchArgs = request.parse()?;
                self.search_web(&args.query).await
            }
            _ => Err(request.unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let tool = SearchTool::new(None, Duration::from_secs(5));
        let err = tool
            .invoke(ToolRequest::new("search_web", json!({"query": "rust"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable { .. }));
    }

    #[test]
    fn formats_numbered_hits() {
        let found = SearchResponse {
            answer: None,
            results: vec![
                SearchHit {
                    title: "Rust".into(),
                    url: "https://rust-lang.org".into(),
                    content: "A language ".into(),
                },
                SearchHit {
                    title: "Crates".into(),
                    url: "https://crates.io".into(),
                    content: "Registry".into(),
                },
            ],
        };
        let text = format_results("rust", &found);
        assert!(text.starts_with("1. Rust\n   https://rust-lang.org\n   A language"));
        assert!(text.contains("2. Crates"));
    }

    #[test]
    fn empty_results_message() {
        let found = SearchResponse {
            answer: None,
            results: vec![],
        };
        assert_eq!(format_results("zzz", &found), "No results found for: zzz");
    }
}
