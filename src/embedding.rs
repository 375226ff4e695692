//! Embedding endpoint client.
//!
//! Calls a hosted inference endpoint (Hugging Face style) that turns a batch
//! of texts into embedding vectors. The endpoint owns the model; this client
//! only speaks the request/response contract. There is no retry here; an
//! embedding failure surfaces to the caller, which decides whether it is
//! fatal (query path) or isolated to a batch (upload path).

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::EmbeddingConfig;

pub struct EmbeddingClient {
    client: reqwest::Client,
    url: String,
}

impl EmbeddingClient {
    /// Build a client for the configured endpoint and model.
    ///
    /// Requires the `HF_API_KEY` environment variable.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = match std::env::var("HF_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("HF_API_KEY environment variable not set"),
        };

        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth)
                .map_err(|_| anyhow::anyhow!("invalid HF_API_KEY value"))?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
        })
    }

    /// Embed a batch of texts, returning one vector per input in input order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({ "inputs": texts });
        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Embedding endpoint error {}: {}", status, body_text);
        }

        let vectors: Vec<Vec<f32>> = response.json().await?;
        if vectors.len() != texts.len() {
            bail!(
                "Embedding endpoint returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            );
        }

        Ok(vectors)
    }

    /// Embed a single query text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))
    }
}
