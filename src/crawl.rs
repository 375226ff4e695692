//! Crawl service client.
//!
//! Doc Scout does not crawl the web itself; a managed crawl service (Tavily)
//! walks the documentation site to a bounded depth and returns extracted page
//! content. This module wraps that HTTP contract behind the [`Crawler`] trait
//! so the ingestion pipeline can be exercised with in-process doubles.
//!
//! A crawl failure is fatal to the ingestion run: errors propagate to the
//! caller uncaught.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CrawlConfig;
use crate::models::Document;

/// A service that maps a root URL to the pages reachable beneath it.
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Crawl `root_url` to at most `max_depth` link hops, returning one
    /// document per extracted page, each tagged with its source URL.
    async fn crawl(&self, root_url: &str, max_depth: usize) -> Result<Vec<Document>>;
}

/// Client for the Tavily crawl API.
///
/// Requires the `TAVILY_API_KEY` environment variable. The request carries no
/// client-side timeout; a deep crawl is expected to take a while.
pub struct TavilyCrawler {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    extract_depth: String,
}

impl TavilyCrawler {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let api_key = match std::env::var("TAVILY_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("TAVILY_API_KEY environment variable not set"),
        };

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            extract_depth: config.extract_depth.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    results: Vec<CrawlResult>,
}

#[derive(Debug, Deserialize)]
struct CrawlResult {
    url: String,
    #[serde(default)]
    raw_content: Option<String>,
}

#[async_trait]
impl Crawler for TavilyCrawler {
    async fn crawl(&self, root_url: &str, max_depth: usize) -> Result<Vec<Document>> {
        let body = serde_json::json!({
            "url": root_url,
            "max_depth": max_depth,
            "extract_depth": self.extract_depth,
        });

        let response = self
            .client
            .post(format!("{}/crawl", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Crawl service error {}: {}", status, body_text);
        }

        let parsed: CrawlResponse = response.json().await?;

        Ok(parsed
            .results
            .into_iter()
            .filter_map(|result| {
                let content = result.raw_content?;
                if content.trim().is_empty() {
                    return None;
                }
                Some(Document::with_source(content, result.url))
            })
            .collect())
    }
}
