use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrawlConfig {
    /// Root URL the crawl starts from.
    pub root_url: String,
    /// Crawl service API endpoint.
    #[serde(default = "default_crawl_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Extraction mode forwarded to the crawl service (`basic` or `advanced`).
    #[serde(default = "default_extract_depth")]
    pub extract_depth: String,
}

fn default_crawl_endpoint() -> String {
    "https://api.tavily.com".to_string()
}
fn default_max_depth() -> usize {
    5
}
fn default_extract_depth() -> String {
    "advanced".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    4000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Vector index name. The index must already exist on the service.
    #[serde(default = "default_index_name")]
    pub name: String,
    /// Vector index API endpoint. Empty means "derive from the index name"
    /// is not supported; set it explicitly for remote use.
    #[serde(default)]
    pub endpoint: String,
    /// Number of documents per upload call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            endpoint: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_index_name() -> String {
    "documentation-helper".to_string()
}
fn default_batch_size() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// Embedding inference endpoint (model path is appended).
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "intfloat/multilingual-e5-large-instruct".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "gemma3:latest".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate crawl
    if config.crawl.root_url.is_empty() {
        anyhow::bail!("crawl.root_url must be set");
    }
    if config.crawl.max_depth == 0 {
        anyhow::bail!("crawl.max_depth must be >= 1");
    }
    match config.crawl.extract_depth.as_str() {
        "basic" | "advanced" => {}
        other => anyhow::bail!(
            "Unknown crawl.extract_depth: '{}'. Must be basic or advanced.",
            other
        ),
    }

    // Validate chunking
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be smaller than chunking.chunk_size");
    }

    // Validate index
    if config.index.batch_size == 0 {
        anyhow::bail!("index.batch_size must be > 0");
    }
    if config.index.name.is_empty() {
        anyhow::bail!("index.name must be set");
    }

    // Validate retrieval
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    Ok(config)
}
