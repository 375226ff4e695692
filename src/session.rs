//! Chat session store.
//!
//! Sessions hold three parallel sequences: the user's prompts, the formatted
//! answers shown back to them, and the raw (speaker, text) turns fed to the
//! model as context. The invariant is that prompts and answers stay equal in
//! length and the raw history is exactly twice as long: one human and one
//! ai turn per exchange, in matching order. Sessions are mutated only by
//! appending a completed exchange.
//!
//! The store is an explicit value passed into the chat loop by reference;
//! there is no ambient global.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::ChatTurn;

/// Session names derived from the first prompt are cut at this many characters.
const NAME_LIMIT: usize = 30;

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    prompts: Vec<String>,
    answers: Vec<String>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    fn new() -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: format!("Chat {}", created_at.format("%m/%d %H:%M")),
            created_at,
            prompts: Vec::new(),
            answers: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Raw turns used as model context.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn exchange_count(&self) -> usize {
        self.prompts.len()
    }

    /// Append a completed exchange.
    ///
    /// `formatted_answer` is what the user sees (answer plus source list);
    /// `raw_answer` is what goes back to the model as context. The first
    /// exchange renames the session after the prompt.
    pub fn append_exchange(&mut self, prompt: &str, formatted_answer: &str, raw_answer: &str) {
        if self.prompts.is_empty() {
            self.name = truncate_name(prompt);
        }
        self.prompts.push(prompt.to_string());
        self.answers.push(formatted_answer.to_string());
        self.history.push(ChatTurn::human(prompt));
        self.history.push(ChatTurn::ai(raw_answer));
    }
}

fn truncate_name(prompt: &str) -> String {
    if prompt.chars().count() > NAME_LIMIT {
        let cut: String = prompt.chars().take(NAME_LIMIT).collect();
        format!("{}...", cut)
    } else {
        prompt.to_string()
    }
}

/// Owns every chat session for the lifetime of the app.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, ChatSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session and return its id.
    pub fn create(&mut self) -> Uuid {
        let session = ChatSession::new();
        let id = session.id;
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut ChatSession> {
        self.sessions.get_mut(&id)
    }

    /// Sessions ordered most recently created first.
    pub fn list_recent(&self) -> Vec<&ChatSession> {
        let mut sessions: Vec<&ChatSession> = self.sessions.values().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    /// Drop every session except `keep`.
    pub fn retain_only(&mut self, keep: Uuid) {
        self.sessions.retain(|id, _| *id == keep);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
