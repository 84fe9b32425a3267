//! Canonical types shared by every codec
//!
//! Nothing in here knows about a specific model family. Wire formats
//! convert to and from these at the edges.

pub mod embeddings;
pub mod message;
pub mod request;
pub mod response;
pub mod stream;

pub use embeddings::{EmbeddingValue, EmbeddingsRequest, EmbeddingsResult, EncodingFormat};
pub use message::{ContentBlock, ImageRef, NormalizedContent, NormalizedMessage, Role, ToolCall, ToolSpec};
pub use request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, NormalizedRequest};
pub use response::{NormalizedChatResult, Usage};
pub use stream::{StreamEvent, ToolCallDelta};
