use std::fmt;
use std::str::FromStr;

use crate::error::AdapterError;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool/function result
    Tool,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            other => Err(AdapterError::InvalidInput(format!("unknown message role `{other}`"))),
        }
    }
}

/// Message in a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMessage {
    /// Role of the message author
    pub role: Role,
    /// Message content
    pub content: NormalizedContent,
    /// ID of the tool call this message answers (tool role only)
    pub tool_call_id: Option<String>,
    /// Tool calls made by the assistant, in order
    pub tool_calls: Vec<ToolCall>,
}

impl NormalizedMessage {
    /// Plain-text message with no tool metadata
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: NormalizedContent::Text(text.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }
}

/// Message content, either plain text or an ordered block list
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedContent {
    /// Plain text content
    Text(String),
    /// Multimodal content blocks
    Blocks(Vec<ContentBlock>),
}

impl Default for NormalizedContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl NormalizedContent {
    /// Concatenate all text, preserving block order and skipping images
    pub fn flatten_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text(text) => Some(text.as_str()),
                    ContentBlock::Image(_) => None,
                })
                .collect(),
        }
    }

    /// Whether the content carries at least one image block
    pub fn has_images(&self) -> bool {
        matches!(self, Self::Blocks(blocks) if blocks.iter().any(|b| matches!(b, ContentBlock::Image(_))))
    }

    /// Prepend text ahead of all existing content
    ///
    /// Text content is concatenated; block content gains a leading text block
    /// so images keep their relative position.
    pub fn prepend_text(&mut self, prefix: &str) {
        match self {
            Self::Text(text) => text.insert_str(0, prefix),
            Self::Blocks(blocks) => blocks.insert(0, ContentBlock::Text(prefix.to_owned())),
        }
    }
}

/// One unit of multimodal content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Text fragment
    Text(String),
    /// Image reference
    Image(ImageRef),
}

/// Reference to an image, either remote or an inline `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Remote URL or `data:<mime>;base64,<payload>` URI
    pub url: String,
    /// MIME type once known
    pub mime_type: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: None,
        }
    }

    /// Whether the image payload is carried inline
    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }
}

/// A tool call requested by the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// A tool the model may call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Function name
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
    /// JSON Schema for the arguments
    pub parameters: serde_json::Value,
}
