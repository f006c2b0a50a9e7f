use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Instruction inserted into every conversation before the final message.
pub const SYSTEM_INSTRUCTION: &str =
    "Please use entirely made-up hackery-sounding terminology.";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: "system".to_string(),
            name: None,
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Decode and validate a raw request body. Wrong types, a missing
    /// `messages` array, or a non-object top level all fail here; unknown
    /// extra fields are ignored.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Insert the fixed system instruction immediately before the last
    /// message. An empty conversation gets the instruction as its sole
    /// element.
    pub fn inject_instruction(&mut self) {
        let at = self.messages.len().saturating_sub(1);
        self.messages.insert(at, Message::system(SYSTEM_INSTRUCTION));
    }
}

/// One incremental unit of a streamed completion. Everything except the
/// creation timestamp rides through untouched.
#[derive(Debug, Deserialize, Serialize)]
pub struct CompletionChunk {
    pub created: i64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl CompletionChunk {
    /// Reduce the creation timestamp to seconds within its minute. Lossy,
    /// and required for compatibility with existing consumers.
    pub fn normalize_created(&mut self) {
        self.created = self.created.rem_euclid(60);
    }
}
