//! Codec for legacy text-completion models (Claude v2 and Instant)

use std::fmt::Write as _;

use super::messages::merged_system_text;
use super::{ChatCodec, ChunkDecoder, ChunkEvent, FamilyPayload, parse_body};
use crate::error::AdapterError;
use crate::family::ModelFamily;
use crate::finish::map_optional;
use crate::protocol::completion::{CompletionRequest, CompletionResponse};
use crate::types::{NormalizedChatResult, NormalizedMessage, NormalizedRequest, Role};

/// Cue that ends every prompt so the model answers as the assistant
const ASSISTANT_CUE: &str = "Assistant:";

/// Legacy completion codec
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionCodec;

/// Linearize non-system turns into a `Human:`/`Assistant:` transcript
pub fn build_prompt(messages: &[NormalizedMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        let speaker = match message.role {
            Role::System => continue,
            Role::User | Role::Tool => "Human",
            Role::Assistant => "Assistant",
        };
        let _ = write!(prompt, "{speaker}: {}\n\n", message.content.flatten_text());
    }
    prompt.push_str(ASSISTANT_CUE);
    prompt
}

impl ChatCodec for CompletionCodec {
    fn family(&self) -> ModelFamily {
        ModelFamily::LegacyCompletionStyle
    }

    fn encode(&self, request: &NormalizedRequest) -> Result<FamilyPayload, AdapterError> {
        let system = merged_system_text(&request.messages);
        let body = CompletionRequest {
            prompt: build_prompt(&request.messages),
            system: (!system.is_empty()).then_some(system),
            max_tokens_to_sample: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop_sequences: request.stop_sequences.clone(),
        };
        FamilyPayload::json(&body)
    }

    fn decode(&self, model_id: &str, body: &[u8]) -> Result<NormalizedChatResult, AdapterError> {
        let response: CompletionResponse = parse_body(body)?;
        Ok(NormalizedChatResult {
            model_id: model_id.to_owned(),
            text: response.completion,
            tool_calls: Vec::new(),
            finish_reason: map_optional(response.stop_reason.as_deref()),
            usage: None,
        })
    }

    fn stream_decoder(&self) -> Box<dyn ChunkDecoder> {
        Box::new(CompletionChunkDecoder)
    }
}

struct CompletionChunkDecoder;

impl ChunkDecoder for CompletionChunkDecoder {
    fn decode_chunk(&mut self, chunk: &[u8]) -> Result<Vec<ChunkEvent>, AdapterError> {
        let response: CompletionResponse = parse_body(chunk)?;
        let mut events = Vec::with_capacity(2);
        if !response.completion.is_empty() {
            events.push(ChunkEvent::Text(response.completion));
        }
        if let Some(reason) = response.stop_reason.filter(|r| !r.is_empty()) {
            events.push(ChunkEvent::Finish(reason));
        }
        Ok(events)
    }
}
