//! End-to-end pipeline tests with in-process doubles.
//!
//! Exercise the ingestion and query pipelines against a scripted crawler,
//! an in-memory vector store, and a scripted chat model. No network, no
//! external services.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use doc_scout::chunk;
use doc_scout::config::{
    ChunkingConfig, Config, CrawlConfig, EmbeddingConfig, IndexConfig, LlmConfig, RetrievalConfig,
};
use doc_scout::console::Console;
use doc_scout::crawl::Crawler;
use doc_scout::ingest;
use doc_scout::llm::{ChatMessage, ChatModel};
use doc_scout::models::{ChatTurn, Document};
use doc_scout::prompts::PromptRegistry;
use doc_scout::query;
use doc_scout::vector_store::VectorStore;

fn test_config(chunk_size: usize, overlap: usize, batch_size: usize) -> Config {
    Config {
        crawl: CrawlConfig {
            root_url: "https://docs.example.com/".to_string(),
            endpoint: "https://crawl.invalid".to_string(),
            max_depth: 3,
            extract_depth: "advanced".to_string(),
        },
        chunking: ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        },
        index: IndexConfig {
            name: "test-index".to_string(),
            endpoint: "https://index.invalid".to_string(),
            batch_size,
        },
        embedding: EmbeddingConfig {
            endpoint: "https://embed.invalid".to_string(),
            model: "test/model".to_string(),
            timeout_secs: 5,
        },
        llm: LlmConfig::default(),
        retrieval: RetrievalConfig { top_k: 2 },
    }
}

/// Crawler returning a fixed set of pages.
struct StaticCrawler {
    pages: Vec<Document>,
}

#[async_trait]
impl Crawler for StaticCrawler {
    async fn crawl(&self, _root_url: &str, _max_depth: usize) -> Result<Vec<Document>> {
        Ok(self.pages.clone())
    }
}

struct FailingCrawler;

#[async_trait]
impl Crawler for FailingCrawler {
    async fn crawl(&self, _root_url: &str, _max_depth: usize) -> Result<Vec<Document>> {
        bail!("crawl service unavailable")
    }
}

/// In-memory store recording writes and retrieval queries.
struct MemoryStore {
    stored: Mutex<Vec<Document>>,
    queries: Mutex<Vec<String>>,
    results: Vec<Document>,
    fail_writes: bool,
}

impl MemoryStore {
    fn new() -> Self {
        Self::with_results(Vec::new())
    }

    fn with_results(results: Vec<Document>) -> Self {
        Self {
            stored: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            results,
            fail_writes: false,
        }
    }

    fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn name(&self) -> &str {
        "test-index"
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<()> {
        if self.fail_writes {
            bail!("index unavailable");
        }
        self.stored.lock().unwrap().extend_from_slice(documents);
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.iter().take(k).cloned().collect())
    }
}

/// Chat model replaying scripted responses and recording every call.
struct ScriptedModel {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.responses.lock().unwrap().pop() {
            Some(response) => Ok(response),
            None => bail!("no scripted response left"),
        }
    }
}

fn pages() -> Vec<Document> {
    vec![
        Document::with_source("alpha ".repeat(40), "https://docs.example.com/a"),
        Document::with_source("beta ".repeat(40), "https://docs.example.com/b"),
    ]
}

#[tokio::test]
async fn ingest_stores_every_chunk_exactly_once() {
    let config = test_config(100, 20, 3);
    let crawler = StaticCrawler { pages: pages() };
    let store = Arc::new(MemoryStore::new());

    let report = ingest::run_ingest(&config, &crawler, store.clone(), Console::plain())
        .await
        .unwrap();

    let expected = chunk::split_documents(&pages(), 100, 20);
    assert_eq!(report.documents_crawled, 2);
    assert_eq!(report.chunks_created, expected.len());
    assert!(report.summary.is_complete());
    assert_eq!(report.summary.total, expected.len().div_ceil(3));

    // Concurrent batches may land in any order, but the multiset of stored
    // chunks must match the chunker's output exactly.
    let mut stored = store.stored.lock().unwrap().clone();
    let mut expected_sorted = expected;
    stored.sort_by(|a, b| a.content.cmp(&b.content));
    expected_sorted.sort_by(|a, b| a.content.cmp(&b.content));
    assert_eq!(stored, expected_sorted);
}

#[tokio::test]
async fn ingest_survives_total_upload_failure() {
    let config = test_config(100, 20, 3);
    let crawler = StaticCrawler { pages: pages() };
    let store = Arc::new(MemoryStore::failing_writes());

    let report = ingest::run_ingest(&config, &crawler, store.clone(), Console::plain())
        .await
        .unwrap();

    assert!(report.summary.total > 0);
    assert_eq!(report.summary.succeeded, 0);
    assert!(store.stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn crawl_failure_is_fatal() {
    let config = test_config(100, 20, 3);
    let store = Arc::new(MemoryStore::new());

    let error = ingest::run_ingest(&config, &FailingCrawler, store, Console::plain())
        .await
        .unwrap_err();
    assert!(error.to_string().contains("crawl service unavailable"));
}

#[tokio::test]
async fn empty_history_passes_the_raw_query_to_retrieval() {
    let retrieved = vec![Document::with_source("chunk", "https://docs.example.com/a")];
    let store = MemoryStore::with_results(retrieved);
    let model = ScriptedModel::new(&["the answer"]);
    let prompts = PromptRegistry::builtin();

    let result = query::answer("what is a chain?", &[], &store, &model, &prompts, 2)
        .await
        .unwrap();

    assert_eq!(
        store.queries.lock().unwrap().as_slice(),
        ["what is a chain?"]
    );
    // No rewrite call happened.
    assert_eq!(model.call_count(), 1);
    assert_eq!(result.query, "what is a chain?");
    assert_eq!(result.answer, "the answer");
}

#[tokio::test]
async fn history_rewrites_the_retrieval_query() {
    let retrieved = vec![Document::with_source("chunk", "https://docs.example.com/a")];
    let store = MemoryStore::with_results(retrieved);
    let model = ScriptedModel::new(&["What is a LangChain chain?", "the answer"]);
    let prompts = PromptRegistry::builtin();
    let history = vec![
        ChatTurn::human("tell me about LangChain"),
        ChatTurn::ai("it is a framework"),
    ];

    let result = query::answer("what about chains?", &history, &store, &model, &prompts, 2)
        .await
        .unwrap();

    assert_eq!(
        store.queries.lock().unwrap().as_slice(),
        ["What is a LangChain chain?"]
    );
    assert_eq!(model.call_count(), 2);
    assert_eq!(result.query, "what about chains?");

    // The rewrite call carried the conversation, the answer call carried
    // the history turns plus the original question.
    let calls = model.calls.lock().unwrap();
    assert!(calls[0][0].content.contains("tell me about LangChain"));
    let answer_call = &calls[1];
    assert_eq!(answer_call.last().unwrap().content, "what about chains?");
    assert!(answer_call
        .iter()
        .any(|m| m.role == ChatMessage::ASSISTANT && m.content == "it is a framework"));
}

#[tokio::test]
async fn sources_are_exactly_the_retrieved_set() {
    let retrieved = vec![
        Document::with_source("chunk a", "https://docs.example.com/a"),
        Document::with_source("chunk b", "https://docs.example.com/b"),
    ];
    let store = MemoryStore::with_results(retrieved.clone());
    let model = ScriptedModel::new(&["the answer"]);
    let prompts = PromptRegistry::builtin();

    let result = query::answer("question", &[], &store, &model, &prompts, 2)
        .await
        .unwrap();

    assert_eq!(result.sources, retrieved);

    // The grounding context handed to the model is built from the same set.
    let calls = model.calls.lock().unwrap();
    let system = &calls[0][0];
    assert_eq!(system.role, ChatMessage::SYSTEM);
    assert!(system.content.contains("chunk a"));
    assert!(system.content.contains("chunk b"));
}
