//! Named prompt templates.
//!
//! A small in-process registry standing in for a hosted prompt hub: fixed
//! templates are fetched by name and rendered with `{placeholder}`
//! substitution. Unknown template names and missing variables are errors;
//! a prompt that renders with a hole in it is worse than no prompt.

use std::collections::HashMap;

use anyhow::{bail, Result};

/// Template used to answer a question from retrieved context.
pub const RETRIEVAL_QA_CHAT: &str = "retrieval-qa-chat";

/// Template used to rewrite a follow-up question into a standalone one.
pub const REPHRASE_QUESTION: &str = "rephrase-question";

const RETRIEVAL_QA_CHAT_TEXT: &str = "\
You are a documentation assistant. Answer the user's question using only the \
context below. If the context does not contain the answer, say you don't \
know; do not invent one.

<context>
{context}
</context>";

const REPHRASE_QUESTION_TEXT: &str = "\
Given the following conversation and a follow up question, rephrase the \
follow up question to be a standalone question that can be understood without \
the conversation.

Chat history:
{chat_history}

Follow up question: {question}

Standalone question:";

/// A prompt with `{name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: &'static str,
    text: &'static str,
}

impl PromptTemplate {
    /// Substitute every placeholder with its value.
    ///
    /// Fails if a placeholder in the template has no matching variable.
    /// Unused variables are ignored. Only the template text is scanned for
    /// placeholders; substituted values are copied through verbatim, so
    /// brace-heavy content (code snippets, prompt examples) never triggers
    /// a missing-variable error or a second substitution.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut rendered = String::with_capacity(self.text.len());
        let mut rest = self.text;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open + 1..].find('}') else {
                break;
            };
            let inner = &rest[open + 1..open + 1 + close];
            if is_placeholder_name(inner) {
                rendered.push_str(&rest[..open]);
                match vars.iter().find(|(name, _)| *name == inner) {
                    Some((_, value)) => rendered.push_str(value),
                    None => bail!(
                        "prompt '{}' is missing a value for '{{{}}}'",
                        self.name,
                        inner
                    ),
                }
                rest = &rest[open + close + 2..];
            } else {
                rendered.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
            }
        }
        rendered.push_str(rest);

        Ok(rendered)
    }
}

/// `{identifier}` placeholders are ascii alphanumerics and underscores.
fn is_placeholder_name(inner: &str) -> bool {
    !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Registry of the fixed templates the pipelines use.
pub struct PromptRegistry {
    templates: HashMap<&'static str, PromptTemplate>,
}

impl PromptRegistry {
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        for (name, text) in [
            (RETRIEVAL_QA_CHAT, RETRIEVAL_QA_CHAT_TEXT),
            (REPHRASE_QUESTION, REPHRASE_QUESTION_TEXT),
        ] {
            templates.insert(name, PromptTemplate { name, text });
        }
        Self { templates }
    }

    pub fn get(&self, name: &str) -> Result<&PromptTemplate> {
        match self.templates.get(name) {
            Some(template) => Ok(template),
            None => bail!("unknown prompt template: '{}'", name),
        }
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
