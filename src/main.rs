//! # Doc Scout CLI (`dscout`)
//!
//! Commands for ingesting a documentation site into the vector index and
//! asking questions against it.
//!
//! ```bash
//! dscout --config ./config/docscout.toml ingest
//! dscout --config ./config/docscout.toml ask "What is a chain?"
//! dscout --config ./config/docscout.toml chat
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use doc_scout::chat;
use doc_scout::config;
use doc_scout::console::Console;
use doc_scout::crawl::TavilyCrawler;
use doc_scout::ingest;
use doc_scout::llm::OllamaModel;
use doc_scout::prompts::PromptRegistry;
use doc_scout::query;
use doc_scout::vector_store::{PineconeStore, VectorStore};

/// Doc Scout, a retrieval-augmented documentation assistant.
#[derive(Parser)]
#[command(
    name = "dscout",
    about = "Doc Scout: crawl, chunk, index, and chat over a documentation site",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docscout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the configured docs site, chunk it, and index the chunks.
    ///
    /// The upload stage runs one concurrent task per batch; a failed batch
    /// is logged and counted but does not abort the run.
    Ingest,

    /// Ask a single question with no chat history.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Start an interactive chat with session management.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let console = Console::stderr();

    match cli.command {
        Commands::Ingest => {
            let crawler = TavilyCrawler::new(&config.crawl)?;
            let store: Arc<dyn VectorStore> =
                Arc::new(PineconeStore::new(&config.index, &config.embedding)?);
            ingest::run_ingest(&config, &crawler, store, console).await?;
        }
        Commands::Ask { question } => {
            let store = PineconeStore::new(&config.index, &config.embedding)?;
            let model = OllamaModel::new(&config.llm)?;
            let prompts = PromptRegistry::builtin();

            let result = query::answer(
                &question,
                &[],
                &store,
                &model,
                &prompts,
                config.retrieval.top_k,
            )
            .await?;

            let sources: BTreeSet<String> = result
                .sources
                .iter()
                .filter_map(|doc| doc.source())
                .map(str::to_string)
                .collect();

            println!("{}", result.answer);
            let rendered = chat::format_sources(&sources);
            if !rendered.is_empty() {
                println!("\n{}", rendered);
            }
        }
        Commands::Chat => {
            let store: Arc<dyn VectorStore> =
                Arc::new(PineconeStore::new(&config.index, &config.embedding)?);
            let model = OllamaModel::new(&config.llm)?;
            chat::run_chat(&config, store, &model, console).await?;
        }
    }

    Ok(())
}
