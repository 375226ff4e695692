//! Vector index abstraction and remote client.
//!
//! The [`VectorStore`] trait is the seam between the pipelines and the
//! managed vector database: `add_documents` for the write path and
//! `similarity_search` for the read path. Retrieval count and similarity
//! metric are owned by the store, not specified here.
//!
//! [`PineconeStore`] is the production implementation: it embeds texts via
//! the configured embedding endpoint, then upserts/queries a Pinecone-style
//! index over HTTP, carrying chunk text and source in vector metadata.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::config::{EmbeddingConfig, IndexConfig};
use crate::embedding::EmbeddingClient;
use crate::models::Document;

/// Metadata field the chunk body is stored under in the index.
const TEXT_FIELD: &str = "text";

/// Write/read contract of the destination vector index.
///
/// Implementations must tolerate concurrent independent `add_documents`
/// calls: each call is its own atomic unit from the store's perspective, and
/// the batch uploader issues many of them in flight at once.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index name, used in reports.
    fn name(&self) -> &str;

    /// Bulk-insert a batch of documents.
    async fn add_documents(&self, documents: &[Document]) -> Result<()>;

    /// Return the `k` stored documents closest to `query`.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>>;
}

/// Remote vector index client (Pinecone data-plane API).
///
/// Requires the `PINECONE_API_KEY` environment variable.
pub struct PineconeStore {
    client: reqwest::Client,
    endpoint: String,
    index_name: String,
    embedder: EmbeddingClient,
}

impl PineconeStore {
    pub fn new(index: &IndexConfig, embedding: &EmbeddingConfig) -> Result<Self> {
        if index.endpoint.is_empty() {
            bail!("index.endpoint must be set for the remote vector store");
        }
        let api_key = match std::env::var("PINECONE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("PINECONE_API_KEY environment variable not set"),
        };

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Api-Key",
            reqwest::header::HeaderValue::from_str(api_key.trim())
                .map_err(|_| anyhow::anyhow!("invalid PINECONE_API_KEY value"))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: index.endpoint.trim_end_matches('/').to_string(),
            index_name: index.name.clone(),
            embedder: EmbeddingClient::new(embedding)?,
        })
    }

    /// Deterministic vector id derived from the chunk's source and content.
    ///
    /// Re-ingesting the same site upserts over the same ids instead of
    /// duplicating every chunk; identical chunks collapse to one vector.
    fn vector_id(document: &Document) -> String {
        let mut seed = Vec::new();
        if let Some(source) = document.source() {
            seed.extend_from_slice(source.as_bytes());
        }
        seed.push(0);
        seed.extend_from_slice(document.content.as_bytes());
        Uuid::new_v5(&Uuid::NAMESPACE_URL, &seed).to_string()
    }

    fn vector_metadata(document: &Document) -> Value {
        let mut fields = Map::new();
        fields.insert(TEXT_FIELD.to_string(), Value::String(document.content.clone()));
        for (key, value) in &document.metadata {
            fields.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(fields)
    }

    fn document_from_metadata(metadata: &Value) -> Option<Document> {
        let fields = metadata.as_object()?;
        let content = fields.get(TEXT_FIELD)?.as_str()?.to_string();
        let metadata = fields
            .iter()
            .filter(|(key, _)| key.as_str() != TEXT_FIELD)
            .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
            .collect();
        Some(Document { content, metadata })
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    fn name(&self) -> &str {
        &self.index_name
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|doc| doc.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let vectors: Vec<Value> = documents
            .iter()
            .zip(embeddings)
            .map(|(doc, values)| {
                json!({
                    "id": Self::vector_id(doc),
                    "values": values,
                    "metadata": Self::vector_metadata(doc),
                })
            })
            .collect();

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.endpoint))
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Vector index upsert error {}: {}", status, body_text);
        }

        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let vector = self.embedder.embed_one(query).await?;

        let response = self
            .client
            .post(format!("{}/query", self.endpoint))
            .json(&json!({
                "vector": vector,
                "topK": k,
                "includeMetadata": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Vector index query error {}: {}", status, body_text);
        }

        let body: Value = response.json().await?;
        let matches = match body.get("matches").and_then(Value::as_array) {
            Some(matches) => matches,
            None => bail!("Invalid query response: missing matches array"),
        };

        Ok(matches
            .iter()
            .filter_map(|entry| entry.get("metadata"))
            .filter_map(Self::document_from_metadata)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn store_for(server: &MockServer) -> PineconeStore {
        std::env::set_var("PINECONE_API_KEY", "test-key");
        std::env::set_var("HF_API_KEY", "test-key");
        PineconeStore::new(
            &IndexConfig {
                name: "documentation-helper".to_string(),
                endpoint: server.base_url(),
                batch_size: 50,
            },
            &EmbeddingConfig {
                endpoint: server.base_url(),
                model: "test/model".to_string(),
                timeout_secs: 5,
            },
        )
        .unwrap()
    }

    async fn mock_embeddings(server: &MockServer, vectors: Value) {
        server
            .mock_async(move |when, then| {
                when.method(POST).path("/test/model");
                then.status(200).json_body(vectors);
            })
            .await;
    }

    #[tokio::test]
    async fn add_documents_upserts_with_metadata() {
        let server = MockServer::start_async().await;
        mock_embeddings(&server, json!([[0.1, 0.2]])).await;
        let upsert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/vectors/upsert")
                    .header("api-key", "test-key")
                    .body_contains("\"text\":\"chunk body\"")
                    .body_contains("https://docs.example.com/a");
                then.status(200).json_body(json!({"upsertedCount": 1}));
            })
            .await;

        let docs = vec![Document::with_source("chunk body", "https://docs.example.com/a")];
        store_for(&server).add_documents(&docs).await.unwrap();
        upsert.assert_async().await;
    }

    #[tokio::test]
    async fn similarity_search_rebuilds_documents() {
        let server = MockServer::start_async().await;
        mock_embeddings(&server, json!([[0.1, 0.2]])).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/query");
                then.status(200).json_body(json!({
                    "matches": [
                        {"id": "1", "score": 0.9, "metadata": {
                            "text": "chunk body",
                            "source": "https://docs.example.com/a"
                        }},
                        {"id": "2", "score": 0.5, "metadata": {
                            "text": "other chunk",
                            "source": "https://docs.example.com/b"
                        }}
                    ]
                }));
            })
            .await;

        let results = store_for(&server)
            .similarity_search("question", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "chunk body");
        assert_eq!(results[0].source(), Some("https://docs.example.com/a"));
    }

    #[test]
    fn vector_ids_are_stable_across_runs() {
        let doc = Document::with_source("chunk body", "https://docs.example.com/a");
        assert_eq!(
            PineconeStore::vector_id(&doc),
            PineconeStore::vector_id(&doc.clone())
        );

        let other_content = Document::with_source("other body", "https://docs.example.com/a");
        let other_source = Document::with_source("chunk body", "https://docs.example.com/b");
        assert_ne!(
            PineconeStore::vector_id(&doc),
            PineconeStore::vector_id(&other_content)
        );
        assert_ne!(
            PineconeStore::vector_id(&doc),
            PineconeStore::vector_id(&other_source)
        );
    }

    #[tokio::test]
    async fn upsert_failure_is_an_error() {
        let server = MockServer::start_async().await;
        mock_embeddings(&server, json!([[0.1, 0.2]])).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/vectors/upsert");
                then.status(500).body("index unavailable");
            })
            .await;

        let docs = vec![Document::with_source("chunk body", "https://docs.example.com/a")];
        let err = store_for(&server).add_documents(&docs).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
