//! Interactive chat loop.
//!
//! A line-oriented REPL over the session store and the query pipeline.
//! Slash commands manage sessions; anything else is a question answered
//! against the current session's history. An error during a submit aborts
//! that turn only: it is logged, the session is left untouched, and the
//! loop continues.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::console::Console;
use crate::llm::ChatModel;
use crate::prompts::PromptRegistry;
use crate::query;
use crate::session::SessionStore;
use crate::vector_store::VectorStore;

pub async fn run_chat(
    config: &Config,
    store: Arc<dyn VectorStore>,
    model: &dyn ChatModel,
    console: Console,
) -> Result<()> {
    let prompts = PromptRegistry::builtin();
    let mut sessions = SessionStore::new();
    let mut current = sessions.create();

    console.header("DOC SCOUT CHAT");
    console.info("ask a question, or use /new, /list, /switch <id>, /clear, /quit");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/new" => {
                current = sessions.create();
                console.success("started a new chat");
            }
            "/list" => {
                for session in sessions.list_recent() {
                    let marker = if session.id() == current { "*" } else { " " };
                    console.info(&format!(
                        "{} {}  {}  ({} messages)",
                        marker,
                        &session.id().to_string()[..8],
                        session.name(),
                        session.exchange_count()
                    ));
                }
            }
            "/clear" => {
                sessions.retain_only(current);
                console.success("cleared all other chats");
            }
            _ if input.starts_with("/switch") => {
                let prefix = input.trim_start_matches("/switch").trim();
                match find_session(&sessions, prefix) {
                    Some(id) => {
                        current = id;
                        let name = sessions.get(id).map(|s| s.name().to_string());
                        console.success(&format!(
                            "switched to {}",
                            name.unwrap_or_default()
                        ));
                    }
                    None => console.warning(&format!("no unique session matches '{}'", prefix)),
                }
            }
            _ if input.starts_with('/') => {
                console.warning(&format!("unknown command: {}", input));
            }
            question => {
                let history = sessions
                    .get(current)
                    .map(|s| s.history().to_vec())
                    .unwrap_or_default();

                match query::answer(
                    question,
                    &history,
                    store.as_ref(),
                    model,
                    &prompts,
                    config.retrieval.top_k,
                )
                .await
                {
                    Ok(result) => {
                        let sources: BTreeSet<String> = result
                            .sources
                            .iter()
                            .filter_map(|doc| doc.source())
                            .map(str::to_string)
                            .collect();
                        let formatted = if sources.is_empty() {
                            result.answer.clone()
                        } else {
                            format!("{}\n\n{}", result.answer, format_sources(&sources))
                        };

                        println!("{}\n", formatted);

                        if let Some(session) = sessions.get_mut(current) {
                            session.append_exchange(question, &formatted, &result.answer);
                        }
                    }
                    Err(error) => {
                        console.error(&format!("failed to answer: {:#}", error));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve a session id prefix to a unique session.
fn find_session(sessions: &SessionStore, prefix: &str) -> Option<uuid::Uuid> {
    if prefix.is_empty() {
        return None;
    }
    let matches: Vec<uuid::Uuid> = sessions
        .list_recent()
        .iter()
        .filter(|session| session.id().to_string().starts_with(prefix))
        .map(|session| session.id())
        .collect();
    match matches.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Render a sorted, de-duplicated source list as numbered lines.
///
/// An empty set renders as an empty string.
pub fn format_sources(sources: &BTreeSet<String>) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let mut rendered = String::from("sources:\n");
    for (position, source) in sources.iter().enumerate() {
        rendered.push_str(&format!("{}. {}\n", position + 1, source));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_render_sorted_and_numbered() {
        let sources: BTreeSet<String> = [
            "https://docs.example.com/b",
            "https://docs.example.com/a",
            "https://docs.example.com/a",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let rendered = format_sources(&sources);
        assert_eq!(
            rendered,
            "sources:\n1. https://docs.example.com/a\n2. https://docs.example.com/b\n"
        );
    }

    #[test]
    fn empty_sources_render_empty() {
        assert_eq!(format_sources(&BTreeSet::new()), "");
    }

    #[test]
    fn session_prefix_must_be_unique() {
        let mut sessions = SessionStore::new();
        let a = sessions.create();
        let b = sessions.create();

        let a_str = a.to_string();
        assert_eq!(find_session(&sessions, &a_str), Some(a));
        assert_eq!(find_session(&sessions, &a_str[..8]), Some(a));
        assert_eq!(find_session(&sessions, ""), None);
        let _ = b;
    }
}
