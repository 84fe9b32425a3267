//! Codec for role/content generation models (Llama family)

use super::{ChatCodec, ChunkDecoder, ChunkEvent, FamilyPayload, parse_body};
use crate::error::AdapterError;
use crate::family::ModelFamily;
use crate::finish::map_optional;
use crate::protocol::generation::{GenerationMessage, GenerationResponse};
use crate::types::{NormalizedChatResult, NormalizedRequest, Usage};

/// Field names a generation-style family uses for its sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationVocabulary {
    /// Name of the token limit field
    pub token_limit: &'static str,
    /// Name of the nucleus sampling field
    pub nucleus: &'static str,
}

/// Generation-style codec parameterized by field vocabulary
#[derive(Debug, Clone, Copy)]
pub struct GenerationCodec {
    vocabulary: GenerationVocabulary,
}

impl GenerationCodec {
    pub const fn new(vocabulary: GenerationVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Vocabulary used by Llama models on Bedrock
    pub const fn llama() -> Self {
        Self::new(GenerationVocabulary {
            token_limit: "max_gen_len",
            nucleus: "top_p",
        })
    }
}

impl ChatCodec for GenerationCodec {
    fn family(&self) -> ModelFamily {
        ModelFamily::GenerationStyle
    }

    fn encode(&self, request: &NormalizedRequest) -> Result<FamilyPayload, AdapterError> {
        let messages: Vec<GenerationMessage> = request
            .messages
            .iter()
            .map(|m| GenerationMessage {
                role: m.role.as_str().to_owned(),
                content: m.content.flatten_text(),
            })
            .collect();

        let mut body = serde_json::Map::new();
        body.insert("messages".to_owned(), serde_json::json!(messages));
        body.insert(self.vocabulary.token_limit.to_owned(), request.max_tokens.into());
        body.insert("temperature".to_owned(), serde_json::json!(request.temperature));
        if let Some(top_p) = request.top_p {
            body.insert(self.vocabulary.nucleus.to_owned(), serde_json::json!(top_p));
        }
        if !request.stop_sequences.is_empty() {
            body.insert("stop".to_owned(), serde_json::json!(request.stop_sequences));
        }
        FamilyPayload::json(&body)
    }

    fn decode(&self, model_id: &str, body: &[u8]) -> Result<NormalizedChatResult, AdapterError> {
        let response: GenerationResponse = parse_body(body)?;
        let usage = match (response.prompt_token_count, response.generation_token_count) {
            (None, None) => None,
            (prompt, completion) => Some(Usage {
                prompt_tokens: prompt.unwrap_or_default(),
                completion_tokens: completion.unwrap_or_default(),
            }),
        };
        Ok(NormalizedChatResult {
            model_id: model_id.to_owned(),
            text: response.generation,
            tool_calls: Vec::new(),
            finish_reason: map_optional(response.stop_reason.as_deref()),
            usage,
        })
    }

    fn stream_decoder(&self) -> Box<dyn ChunkDecoder> {
        Box::new(GenerationChunkDecoder)
    }
}

struct GenerationChunkDecoder;

impl ChunkDecoder for GenerationChunkDecoder {
    fn decode_chunk(&mut self, chunk: &[u8]) -> Result<Vec<ChunkEvent>, AdapterError> {
        let response: GenerationResponse = parse_body(chunk)?;
        let mut events = Vec::with_capacity(2);
        if !response.generation.is_empty() {
            events.push(ChunkEvent::Text(response.generation));
        }
        if let Some(reason) = response.stop_reason.filter(|r| !r.is_empty()) {
            events.push(ChunkEvent::Finish(reason));
        }
        Ok(events)
    }
}
