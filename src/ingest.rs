//! Ingestion pipeline orchestration.
//!
//! Coordinates the full ingest flow: crawl → chunk → batch upload →
//! summary report. Stages run sequentially, each blocking on the previous;
//! the upload stage is the only concurrent one. A crawl or chunking failure
//! is fatal to the whole run; only the upload stage has per-batch fault
//! isolation (see [`crate::index`]).

use std::sync::Arc;

use anyhow::Result;

use crate::chunk;
use crate::config::Config;
use crate::console::Console;
use crate::crawl::Crawler;
use crate::index;
use crate::models::IndexSummary;
use crate::vector_store::VectorStore;

/// End-of-run counts for the ingestion pipeline.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub documents_crawled: usize,
    pub chunks_created: usize,
    pub summary: IndexSummary,
}

pub async fn run_ingest(
    config: &Config,
    crawler: &dyn Crawler,
    store: Arc<dyn VectorStore>,
    console: Console,
) -> Result<IngestReport> {
    console.header("DOC SCOUT INGESTION");
    console.info(&format!(
        "crawling {} to depth {}",
        config.crawl.root_url, config.crawl.max_depth
    ));

    let documents = crawler
        .crawl(&config.crawl.root_url, config.crawl.max_depth)
        .await?;
    console.success(&format!(
        "crawl complete: {} documents found",
        documents.len()
    ));

    console.header("CHUNKING");
    console.info(&format!(
        "splitting {} documents (chunk size {}, overlap {})",
        documents.len(),
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    ));
    let chunks = chunk::split_documents(
        &documents,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    );
    console.success(&format!("chunking complete: {} chunks created", chunks.len()));

    console.header("VECTOR STORAGE");
    let store_name = store.name().to_string();
    let chunks_created = chunks.len();
    let summary =
        index::index_documents(store, chunks, config.index.batch_size, console).await;

    console.header("PIPELINE COMPLETED");
    console.info(&format!("documents crawled: {}", documents.len()));
    console.info(&format!("chunks created: {}", chunks_created));
    console.info(&format!("vector store: {}", store_name));

    Ok(IngestReport {
        documents_crawled: documents.len(),
        chunks_created,
        summary,
    })
}
