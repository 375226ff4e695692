//! # Doc Scout
//!
//! A retrieval-augmented documentation assistant.
//!
//! Doc Scout crawls a documentation site through a managed crawl service,
//! splits the pages into overlapping chunks, and uploads them in concurrent
//! batches to a remote vector index. At query time it rewrites follow-up
//! questions using the conversation so far, retrieves the closest chunks,
//! and asks a chat model to answer grounded only in those chunks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────────┐
//! │  Crawl   │──▶│   Chunker    │──▶│ Batch Uploader │──▶ vector index
//! │ service  │   │ (overlapping)│   │  (concurrent)  │
//! └──────────┘   └──────────────┘   └────────────────┘
//!
//! question + history ──▶ rewrite ──▶ retrieve ──▶ chat model ──▶ answer + sources
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dscout ingest                 # crawl, chunk, and index the docs site
//! dscout ask "What is a chain?" # one-shot question
//! dscout chat                   # interactive chat with sessions
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`console`] | Colored console reporting |
//! | [`crawl`] | Crawl service client |
//! | [`chunk`] | Overlapping text splitter |
//! | [`embedding`] | Embedding endpoint client |
//! | [`vector_store`] | Vector index abstraction and remote client |
//! | [`index`] | Batched, concurrent document indexing |
//! | [`ingest`] | Crawl → chunk → index pipeline |
//! | [`prompts`] | Named prompt templates |
//! | [`llm`] | Chat model abstraction and client |
//! | [`query`] | History-aware retrieval QA |
//! | [`session`] | Chat session store |
//! | [`chat`] | Interactive chat loop |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod console;
pub mod crawl;
pub mod embedding;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod query;
pub mod session;
pub mod vector_store;
