//! Core data models used throughout Doc Scout.
//!
//! These types represent the documents, upload summaries, chat turns, and
//! answers that flow through the ingestion and query pipelines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the origin URL of a document.
pub const SOURCE_KEY: &str = "source";

/// A unit of text plus its metadata.
///
/// Produced by the crawl step (one per page) and by the chunker (one input
/// document yields N chunks sharing the parent's metadata). Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// Create a document tagged with its source URL.
    pub fn with_source(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(SOURCE_KEY.to_string(), source.into());
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// The origin URL, if the document carries one.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

/// Aggregate outcome of a batched upload: how many batches succeeded out of
/// how many were dispatched. Per-batch failures are counted, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl IndexSummary {
    /// True when every batch (possibly zero of them) landed.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Human,
    Ai,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Human => "human",
            Speaker::Ai => "ai",
        }
    }
}

/// One (speaker, text) entry of the raw conversation fed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Human,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Ai,
            text: text.into(),
        }
    }
}

/// Result of one query-pipeline invocation.
///
/// `sources` is exactly the retrieved set that was handed to the model;
/// nothing is re-ranked, added, or dropped afterward.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Document>,
}
