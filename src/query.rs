//! History-aware retrieval QA.
//!
//! One invocation: rewrite the question into a standalone one when there is
//! conversation history, retrieve the closest chunks for it, then ask the
//! model to answer using only those chunks (the original question and the
//! history ride along for conversational continuity). Stateless apart from
//! the history the caller supplies. No retry, no caching.

use anyhow::Result;

use crate::llm::{ChatMessage, ChatModel};
use crate::models::{AnswerResult, ChatTurn, Speaker};
use crate::prompts::{PromptRegistry, REPHRASE_QUESTION, RETRIEVAL_QA_CHAT};
use crate::vector_store::VectorStore;

/// Answer `query` grounded in retrieved chunks.
///
/// The returned [`AnswerResult::sources`] is exactly the retrieved set that
/// was handed to the model.
pub async fn answer(
    query: &str,
    history: &[ChatTurn],
    store: &dyn VectorStore,
    model: &dyn ChatModel,
    prompts: &PromptRegistry,
    top_k: usize,
) -> Result<AnswerResult> {
    let retrieval_query = if history.is_empty() {
        query.to_string()
    } else {
        condense_question(query, history, model, prompts).await?
    };

    let sources = store.similarity_search(&retrieval_query, top_k).await?;

    let context = sources
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let system = prompts
        .get(RETRIEVAL_QA_CHAT)?
        .render(&[("context", &context)])?;

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    for turn in history {
        messages.push(match turn.speaker {
            Speaker::Human => ChatMessage::user(&turn.text),
            Speaker::Ai => ChatMessage::assistant(&turn.text),
        });
    }
    messages.push(ChatMessage::user(query));

    let answer = model.generate(&messages).await?;

    Ok(AnswerResult {
        query: query.to_string(),
        answer,
        sources,
    })
}

/// Rewrite a follow-up question into a standalone one using the history.
async fn condense_question(
    query: &str,
    history: &[ChatTurn],
    model: &dyn ChatModel,
    prompts: &PromptRegistry,
) -> Result<String> {
    let chat_history = format_history(history);
    let prompt = prompts
        .get(REPHRASE_QUESTION)?
        .render(&[("chat_history", &chat_history), ("question", query)])?;

    let rewritten = model.generate(&[ChatMessage::user(prompt)]).await?;
    let rewritten = rewritten.trim();
    if rewritten.is_empty() {
        // A blank rewrite would retrieve nothing useful; fall back to the input.
        Ok(query.to_string())
    } else {
        Ok(rewritten.to_string())
    }
}

/// Render history as `speaker: text` lines for the rephrase prompt.
pub(crate) fn format_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
