//! HTTP client for a hosted vector-search endpoint.
//!
//! Posts the query to `{base_url}/search` and maps result rows onto
//! [`Snippet`]s. Ranking and truncation stay in the core; this adapter only
//! widens the fetch under link prioritization so the core has linked
//! snippets to promote.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{KnowledgeBase, KnowledgeError, Snippet, SnippetLink};

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Base URL of the search service.
    pub base_url: String,
    /// Optional bearer token.
    api_key: Option<Secret<String>>,
    /// Request timeout.
    pub timeout: Duration,
}

impl KnowledgeConfig {
    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Vector-search HTTP client.
pub struct HttpKnowledgeBase {
    config: KnowledgeConfig,
    client: Client,
}

impl HttpKnowledgeBase {
    /// Creates a client over the given configuration.
    pub fn new(config: KnowledgeConfig) -> Result<Self, KnowledgeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                KnowledgeError::Unavailable(format!("HTTP client build failed: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url)
    }

    async fn handle_status(&self, response: Response) -> Result<Response, KnowledgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(KnowledgeError::Unavailable(format!(
                "Server error {}: {}",
                status, body
            )))
        } else {
            Err(KnowledgeError::Network(format!(
                "Unexpected status {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        link_priority: bool,
    ) -> Result<Vec<Snippet>, KnowledgeError> {
        // Fetch wider when links matter; the core re-ranks and trims.
        let fetch_k = if link_priority { top_k * 2 } else { top_k };
        let body = SearchRequest {
            query: query.to_string(),
            top_k: fetch_k,
        };

        let mut request = self.client.post(self.search_url()).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.header(
                "Authorization",
                format!("Bearer {}", key.expose_secret()),
            );
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                KnowledgeError::Unavailable(e.to_string())
            } else {
                KnowledgeError::Network(e.to_string())
            }
        })?;
        let response = self.handle_status(response).await?;

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::Parse(format!("Failed to parse results: {}", e)))?;

        Ok(results.results.into_iter().map(Snippet::from).collect())
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    score: f32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    links: Vec<SearchResultLink>,
}

#[derive(Debug, Deserialize)]
struct SearchResultLink {
    label: String,
    url: String,
}

impl From<SearchResult> for Snippet {
    fn from(result: SearchResult) -> Self {
        Snippet {
            score: result.score,
            text: result.text,
            url: result.url.filter(|u| !u.is_empty()),
            title: result.title.filter(|t| !t.is_empty()),
            links: result
                .links
                .into_iter()
                .map(|link| SnippetLink {
                    label: link.label,
                    url: link.url,
                })
                .collect(),
        }
    }
}
