//! Per-family payload codecs and the registry that dispatches to them
//!
//! A codec owns the full wire format of one [`ModelFamily`]: request
//! encoding, response decoding and incremental decoding of stream chunks.
//! Only the owning codec ever inspects a [`FamilyPayload`].

pub mod completion;
pub mod embedding;
pub mod generation;
pub mod messages;

use std::collections::HashMap;
use std::sync::Arc;

pub use completion::CompletionCodec;
pub use embedding::CohereEmbeddingCodec;
pub use generation::GenerationCodec;
pub use messages::MessagesCodec;

use crate::error::AdapterError;
use crate::family::{FamilyTable, ModelFamily};
use crate::types::{
    EmbeddingsRequest, EmbeddingsResult, EncodingFormat, NormalizedChatResult, NormalizedRequest, ToolCallDelta,
};

/// Encoded request body for one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyPayload(Vec<u8>);

impl FamilyPayload {
    /// Serialize a wire struct into a payload
    pub(crate) fn json<T: serde::Serialize>(body: &T) -> Result<Self, AdapterError> {
        serde_json::to_vec(body)
            .map(Self)
            .map_err(|e| AdapterError::InvalidInput(format!("failed to encode request body: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Event decoded from one upstream stream chunk, before finish mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEvent {
    /// Text fragment
    Text(String),
    /// Tool call fragment
    ToolCall(ToolCallDelta),
    /// Raw upstream stop reason
    Finish(String),
    /// Upstream reported an in-band error
    Error(String),
}

/// Incremental decoder for one stream
///
/// Holds whatever cross-chunk state the family needs, such as tool call
/// indices, so a fresh decoder is created per stream.
pub trait ChunkDecoder: Send {
    /// Decode one raw chunk into zero or more events
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MalformedUpstreamResponse`] when the chunk is not
    /// valid for this family. The translator skips such chunks.
    fn decode_chunk(&mut self, chunk: &[u8]) -> Result<Vec<ChunkEvent>, AdapterError>;
}

/// Two-way codec for a chat model family
pub trait ChatCodec: Send + Sync {
    /// Family this codec serves
    fn family(&self) -> ModelFamily;

    /// Whether image blocks survive encoding (otherwise content is flattened)
    fn accepts_images(&self) -> bool {
        false
    }

    /// Encode a normalized request into the family's body format
    fn encode(&self, request: &NormalizedRequest) -> Result<FamilyPayload, AdapterError>;

    /// Decode a complete response body
    fn decode(&self, model_id: &str, body: &[u8]) -> Result<NormalizedChatResult, AdapterError>;

    /// Fresh decoder for one stream
    fn stream_decoder(&self) -> Box<dyn ChunkDecoder>;
}

/// Two-way codec for an embedding model family
pub trait EmbeddingCodec: Send + Sync {
    /// Family this codec serves
    fn family(&self) -> ModelFamily;

    /// Encode an embeddings request
    fn encode(&self, request: &EmbeddingsRequest) -> Result<FamilyPayload, AdapterError>;

    /// Decode a response body into the requested encoding
    fn decode(&self, model_id: &str, body: &[u8], encoding: EncodingFormat) -> Result<EmbeddingsResult, AdapterError>;
}

/// Family table plus the codecs registered per family
#[derive(Clone)]
pub struct CodecRegistry {
    families: FamilyTable,
    chat: HashMap<ModelFamily, Arc<dyn ChatCodec>>,
    embedding: HashMap<ModelFamily, Arc<dyn EmbeddingCodec>>,
}

impl CodecRegistry {
    /// Registry with the given family table and no codecs
    pub fn new(families: FamilyTable) -> Self {
        Self {
            families,
            chat: HashMap::new(),
            embedding: HashMap::new(),
        }
    }

    /// Built-in families with their codecs
    pub fn builtin() -> Self {
        Self::new(FamilyTable::builtin())
            .register_chat(Arc::new(MessagesCodec))
            .register_chat(Arc::new(CompletionCodec))
            .register_chat(Arc::new(GenerationCodec::llama()))
            .register_embedding(Arc::new(CohereEmbeddingCodec))
    }

    /// Register a chat codec under its family, replacing any earlier one
    #[must_use]
    pub fn register_chat(mut self, codec: Arc<dyn ChatCodec>) -> Self {
        self.chat.insert(codec.family(), codec);
        self
    }

    /// Register an embedding codec under its family, replacing any earlier one
    #[must_use]
    pub fn register_embedding(mut self, codec: Arc<dyn EmbeddingCodec>) -> Self {
        self.embedding.insert(codec.family(), codec);
        self
    }

    /// Classify a model id
    pub fn classify(&self, model_id: &str) -> ModelFamily {
        self.families.classify(model_id)
    }

    /// Chat codec for a model id
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnsupportedModel`] when the model classifies as
    /// [`ModelFamily::Unknown`] or its family has no chat codec.
    pub fn chat_codec(&self, model_id: &str) -> Result<Arc<dyn ChatCodec>, AdapterError> {
        let family = self.classify(model_id);
        if family == ModelFamily::Unknown {
            return Err(AdapterError::unsupported(model_id));
        }
        self.chat
            .get(&family)
            .cloned()
            .ok_or_else(|| AdapterError::unsupported(model_id))
    }

    /// Embedding codec for a model id
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnsupportedModel`] when the model's family has
    /// no embedding codec.
    pub fn embedding_codec(&self, model_id: &str) -> Result<Arc<dyn EmbeddingCodec>, AdapterError> {
        let family = self.classify(model_id);
        if family == ModelFamily::Unknown {
            return Err(AdapterError::unsupported(model_id));
        }
        self.embedding
            .get(&family)
            .cloned()
            .ok_or_else(|| AdapterError::unsupported(model_id))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("families", &self.families)
            .field("chat", &self.chat.keys().collect::<Vec<_>>())
            .field("embedding", &self.embedding.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Parse a response body, mapping failures to a malformed-upstream error
pub(crate) fn parse_body<'a, T: serde::Deserialize<'a>>(body: &'a [u8]) -> Result<T, AdapterError> {
    serde_json::from_slice(body).map_err(AdapterError::malformed)
}
