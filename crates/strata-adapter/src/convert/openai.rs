//! Conversion between canonical types and `OpenAI` wire format

use base64::Engine as _;

use crate::catalog::CatalogEntry;
use crate::content::normalize;
use crate::error::AdapterError;
use crate::protocol::openai::{
    OpenAiChoice, OpenAiChoiceMessage, OpenAiEmbedding, OpenAiEmbeddingsRequest, OpenAiEmbeddingsResponse,
    OpenAiEmbeddingsUsage, OpenAiFunctionCall, OpenAiMessage, OpenAiModel, OpenAiModelList, OpenAiRequest,
    OpenAiResponse, OpenAiStreamChoice, OpenAiStreamChunk, OpenAiStreamDelta, OpenAiStreamFunctionCall,
    OpenAiStreamToolCall, OpenAiTool, OpenAiToolCall, OpenAiUsage,
};
use crate::types::{
    EmbeddingValue, EmbeddingsRequest, EmbeddingsResult, EncodingFormat, NormalizedChatResult, NormalizedMessage,
    NormalizedRequest, StreamEvent, ToolCall, ToolSpec, Usage,
};

// -- Inbound: OpenAI wire format -> canonical types --

/// Pick the requested model or the configured default
fn model_or_default(model: Option<String>, default_model: &str) -> String {
    model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_model.to_owned())
}

/// Convert an inbound chat request
///
/// # Errors
///
/// Returns [`AdapterError::InvalidInput`] for unknown roles or negative
/// temperature.
pub fn chat_request_to_normalized(
    request: OpenAiRequest,
    default_model: &str,
) -> Result<NormalizedRequest, AdapterError> {
    let messages = request
        .messages
        .into_iter()
        .map(message_to_normalized)
        .collect::<Result<Vec<_>, _>>()?;

    let tools = request
        .tools
        .unwrap_or_default()
        .into_iter()
        .map(tool_to_spec)
        .collect();

    Ok(NormalizedRequest::new(model_or_default(request.model, default_model), messages)
        .with_max_tokens(request.max_tokens)
        .with_temperature(request.temperature)?
        .with_top_p(request.top_p)
        .with_stop_sequences(request.stop.map(|s| s.into_vec()).unwrap_or_default())
        .with_tools(tools))
}

fn message_to_normalized(message: OpenAiMessage) -> Result<NormalizedMessage, AdapterError> {
    Ok(NormalizedMessage {
        role: message.role.parse()?,
        content: normalize(&message.content),
        tool_call_id: message.tool_call_id,
        tool_calls: message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect(),
    })
}

fn tool_to_spec(tool: OpenAiTool) -> ToolSpec {
    ToolSpec {
        name: tool.function.name,
        description: tool.function.description,
        parameters: tool
            .function
            .parameters
            .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}})),
    }
}

/// Convert an inbound embeddings request
///
/// # Errors
///
/// Returns [`AdapterError::InvalidInput`] for an unknown `encoding_format`.
pub fn embeddings_request_to_normalized(
    request: OpenAiEmbeddingsRequest,
    default_model: &str,
) -> Result<EmbeddingsRequest, AdapterError> {
    let encoding = match request.encoding_format.as_deref() {
        None | Some("" | "float") => EncodingFormat::Float,
        Some("base64") => EncodingFormat::Base64,
        Some(other) => {
            return Err(AdapterError::InvalidInput(format!("unsupported encoding_format `{other}`")));
        }
    };
    Ok(EmbeddingsRequest {
        model_id: model_or_default(request.model, default_model),
        input: request.input,
        encoding,
    })
}

// -- Outbound: canonical types -> OpenAI wire format --

fn usage_to_openai(usage: Usage) -> OpenAiUsage {
    OpenAiUsage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens(),
    }
}

/// Build a chat completion response
pub fn chat_result_to_openai(result: NormalizedChatResult, id: &str, created: u64) -> OpenAiResponse {
    let tool_calls = (!result.tool_calls.is_empty()).then(|| {
        result
            .tool_calls
            .into_iter()
            .map(|tc| OpenAiToolCall {
                id: tc.id,
                tool_type: "function".to_owned(),
                function: OpenAiFunctionCall {
                    name: tc.name,
                    arguments: tc.arguments,
                },
            })
            .collect()
    });

    OpenAiResponse {
        id: id.to_owned(),
        object: "chat.completion".to_owned(),
        created,
        model: result.model_id,
        choices: vec![OpenAiChoice {
            index: 0,
            message: OpenAiChoiceMessage {
                role: "assistant".to_owned(),
                content: Some(result.text),
                tool_calls,
            },
            finish_reason: result.finish_reason,
        }],
        usage: result.usage.map(usage_to_openai),
    }
}

fn chunk(
    id: &str,
    created: u64,
    model: &str,
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
) -> OpenAiStreamChunk {
    OpenAiStreamChunk {
        id: id.to_owned(),
        object: "chat.completion.chunk".to_owned(),
        created,
        model: model.to_owned(),
        choices: vec![OpenAiStreamChoice {
            index: 0,
            delta,
            finish_reason,
        }],
    }
}

/// First chunk of a stream, announcing the assistant role
pub fn role_chunk(id: &str, created: u64, model: &str) -> OpenAiStreamChunk {
    let delta = OpenAiStreamDelta {
        role: Some("assistant".to_owned()),
        ..OpenAiStreamDelta::default()
    };
    chunk(id, created, model, delta, None)
}

/// Convert a stream event into a chunk
///
/// Returns `None` for [`StreamEvent::Error`], which is not a chunk.
pub fn stream_event_to_chunk(event: StreamEvent, id: &str, created: u64, model: &str) -> Option<OpenAiStreamChunk> {
    let (delta, finish_reason) = match event {
        StreamEvent::TextDelta(text) => (
            OpenAiStreamDelta {
                content: Some(text),
                ..OpenAiStreamDelta::default()
            },
            None,
        ),
        StreamEvent::ToolCallDelta(tc) => (
            OpenAiStreamDelta {
                tool_calls: Some(vec![OpenAiStreamToolCall {
                    index: tc.index,
                    tool_type: tc.id.is_some().then(|| "function".to_owned()),
                    id: tc.id,
                    function: OpenAiStreamFunctionCall {
                        name: tc.name,
                        arguments: tc.arguments,
                    },
                }]),
                ..OpenAiStreamDelta::default()
            },
            None,
        ),
        StreamEvent::FinishReason(reason) => (OpenAiStreamDelta::default(), Some(reason)),
        StreamEvent::Error(_) => return None,
    };
    Some(chunk(id, created, model, delta, finish_reason))
}

/// Build an embeddings response
pub fn embeddings_result_to_openai(result: EmbeddingsResult) -> OpenAiEmbeddingsResponse {
    let data = result
        .embeddings
        .into_iter()
        .zip(0u32..)
        .map(|(value, index)| OpenAiEmbedding {
            object: "embedding".to_owned(),
            embedding: match value {
                EmbeddingValue::Float(vector) => serde_json::json!(vector),
                EmbeddingValue::Base64(encoded) => serde_json::Value::String(encoded),
            },
            index,
        })
        .collect();

    OpenAiEmbeddingsResponse {
        object: "list".to_owned(),
        data,
        model: result.model_id,
        usage: OpenAiEmbeddingsUsage {
            prompt_tokens: result.usage.prompt_tokens,
            total_tokens: result.usage.total_tokens(),
        },
    }
}

/// Build a models list from the catalog
pub fn catalog_to_model_list(entries: Vec<CatalogEntry>, created: u64) -> OpenAiModelList {
    OpenAiModelList {
        object: "list".to_owned(),
        data: entries
            .into_iter()
            .map(|entry| OpenAiModel {
                id: entry.model_id,
                object: "model".to_owned(),
                created,
                owned_by: entry.owner,
            })
            .collect(),
    }
}

/// Decode a base64 embedding produced by this gateway back into a vector
///
/// Clients of the base64 encoding receive each vector's JSON text in
/// standard base64; this is the inverse, used by tests and tooling.
pub fn decode_base64_embedding(encoded: &str) -> Option<Vec<f64>> {
    let json = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    serde_json::from_slice(&json).ok()
}
