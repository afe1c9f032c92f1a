//! Domain types shared across ProfRAG crates.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProfRagError, Result};

/// Number of professor records retrieved per query. Fixed by policy.
pub const TOP_K: usize = 3;

/// Dense embedding of a piece of text.
pub type EmbeddingVector = Vec<f32>;

/// Message role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A received conversation. Always holds at least one message; the last one
/// is the query turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Wrap a message list, rejecting an empty one.
    pub fn new(messages: Vec<Message>) -> Result<Self> {
        if messages.is_empty() {
            return Err(ProfRagError::malformed("conversation has no messages"));
        }
        Ok(Self { messages })
    }

    /// Parse a JSON array body (`[{"role": ..., "content": ...}, ...]`).
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ProfRagError::malformed("request body is empty"));
        }
        let messages: Vec<Message> = serde_json::from_slice(body)
            .map_err(|e| ProfRagError::malformed(format!("expected a JSON array of messages: {e}")))?;
        Self::new(messages)
    }

    /// The query turn.
    pub fn last(&self) -> &Message {
        // `new` guarantees at least one element.
        &self.messages[self.messages.len() - 1]
    }

    /// Everything before the query turn.
    pub fn history(&self) -> &[Message] {
        &self.messages[..self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// One match returned by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedRecord {
    /// Professor identifier (the vector id).
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Opaque metadata as stored in the index. `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Map<String, Value>,
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(d).map(Option::unwrap_or_default)
}

impl RetrievedRecord {
    pub fn new(id: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            score: None,
            metadata,
        }
    }

    /// Render a metadata field as plain text. `None` when absent or null.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn subject(&self) -> Option<String> {
        self.field("subject")
    }

    pub fn stars(&self) -> Option<String> {
        self.field("stars")
    }

    /// Review text, only when the index actually stores one.
    pub fn review(&self) -> Option<String> {
        match self.metadata.get("review")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}
