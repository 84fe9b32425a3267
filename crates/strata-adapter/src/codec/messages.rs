//! Codec for Anthropic Messages models on Bedrock

use super::{ChatCodec, ChunkDecoder, ChunkEvent, FamilyPayload, parse_body};
use crate::error::AdapterError;
use crate::family::ModelFamily;
use crate::finish::map_optional;
use crate::image::split_data_uri;
use crate::protocol::messages::{
    ANTHROPIC_VERSION, ImageSource, MessagesContent, MessagesContentBlock, MessagesMessage, MessagesRequest,
    MessagesResponse, MessagesResponseBlock, MessagesStreamEvent, MessagesTool, StreamContentBlock, StreamDelta,
};
use crate::types::{
    ContentBlock, NormalizedChatResult, NormalizedContent, NormalizedMessage, NormalizedRequest, Role, ToolCall,
    ToolCallDelta, Usage,
};

/// Wrap merged system text for injection into the first user turn
///
/// The target format has no independent system slot, so system text rides
/// ahead of the first user message inside a tagged `Human:` preamble.
pub fn system_wrapper(system: &str) -> String {
    format!("Human: <system>\n{system}\n</system>\n\n")
}

/// Concatenate the text of every system message in order
pub(crate) fn merged_system_text(messages: &[NormalizedMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.flatten_text())
        .collect()
}

/// Messages-style codec
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesCodec;

impl ChatCodec for MessagesCodec {
    fn family(&self) -> ModelFamily {
        ModelFamily::MessagesStyle
    }

    fn accepts_images(&self) -> bool {
        true
    }

    fn encode(&self, request: &NormalizedRequest) -> Result<FamilyPayload, AdapterError> {
        let body = MessagesRequest {
            anthropic_version: ANTHROPIC_VERSION.to_owned(),
            messages: encode_messages(&request.messages)?,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stop_sequences: request.stop_sequences.clone(),
            tools: request
                .tools
                .iter()
                .map(|tool| MessagesTool {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    input_schema: tool.parameters.clone(),
                })
                .collect(),
        };
        FamilyPayload::json(&body)
    }

    fn decode(&self, model_id: &str, body: &[u8]) -> Result<NormalizedChatResult, AdapterError> {
        let response: MessagesResponse = parse_body(body)?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                MessagesResponseBlock::Text { text: t } => text.push_str(&t),
                MessagesResponseBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                }),
                MessagesResponseBlock::Other => {}
            }
        }

        Ok(NormalizedChatResult {
            model_id: model_id.to_owned(),
            text,
            tool_calls,
            finish_reason: map_optional(response.stop_reason.as_deref()),
            usage: response.usage.map(|u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
        })
    }

    fn stream_decoder(&self) -> Box<dyn ChunkDecoder> {
        Box::new(MessagesChunkDecoder::default())
    }
}

/// Build the wire message list, merging system text into the first user turn
fn encode_messages(messages: &[NormalizedMessage]) -> Result<Vec<MessagesMessage>, AdapterError> {
    let system = merged_system_text(messages);
    let mut turns: Vec<NormalizedMessage> = messages.iter().filter(|m| m.role != Role::System).cloned().collect();

    if !system.is_empty() {
        let wrapper = system_wrapper(&system);
        match turns.iter_mut().find(|m| m.role == Role::User) {
            Some(first_user) => first_user.content.prepend_text(&wrapper),
            None => turns.insert(0, NormalizedMessage::text(Role::User, wrapper)),
        }
    }

    let mut out: Vec<MessagesMessage> = Vec::with_capacity(turns.len());
    for turn in turns {
        match turn.role {
            Role::User => out.push(MessagesMessage {
                role: "user".to_owned(),
                content: encode_content(&turn.content)?,
            }),
            Role::Assistant => out.push(encode_assistant(&turn)?),
            Role::Tool => {
                let block = MessagesContentBlock::ToolResult {
                    tool_use_id: turn.tool_call_id.clone().unwrap_or_default(),
                    content: turn.content.flatten_text(),
                };
                // Consecutive tool results share one user turn
                if let Some(MessagesMessage {
                    content: MessagesContent::Blocks(blocks),
                    ..
                }) = out.last_mut().filter(|m| is_tool_result_turn(m))
                {
                    blocks.push(block);
                } else {
                    out.push(MessagesMessage {
                        role: "user".to_owned(),
                        content: MessagesContent::Blocks(vec![block]),
                    });
                }
            }
            Role::System => {}
        }
    }
    Ok(out)
}

fn is_tool_result_turn(message: &MessagesMessage) -> bool {
    message.role == "user"
        && matches!(&message.content, MessagesContent::Blocks(blocks)
            if !blocks.is_empty() && blocks.iter().all(|b| matches!(b, MessagesContentBlock::ToolResult { .. })))
}

fn encode_assistant(message: &NormalizedMessage) -> Result<MessagesMessage, AdapterError> {
    if message.tool_calls.is_empty() {
        return Ok(MessagesMessage {
            role: "assistant".to_owned(),
            content: encode_content(&message.content)?,
        });
    }

    let mut blocks = Vec::new();
    let text = message.content.flatten_text();
    if !text.is_empty() {
        blocks.push(MessagesContentBlock::Text { text });
    }
    for call in &message.tool_calls {
        let input = serde_json::from_str(&call.arguments).map_err(|e| {
            AdapterError::InvalidInput(format!("tool call `{}` has invalid JSON arguments: {e}", call.id))
        })?;
        blocks.push(MessagesContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input,
        });
    }
    Ok(MessagesMessage {
        role: "assistant".to_owned(),
        content: MessagesContent::Blocks(blocks),
    })
}

fn encode_content(content: &NormalizedContent) -> Result<MessagesContent, AdapterError> {
    match content {
        NormalizedContent::Text(text) => Ok(MessagesContent::Text(text.clone())),
        NormalizedContent::Blocks(blocks) => blocks
            .iter()
            .map(|block| match block {
                ContentBlock::Text(text) => Ok(MessagesContentBlock::Text { text: text.clone() }),
                ContentBlock::Image(image) => {
                    let (media_type, data) = split_data_uri(&image.url).ok_or_else(|| {
                        AdapterError::InvalidInput("image must be resolved to an inline data URI".to_owned())
                    })?;
                    Ok(MessagesContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64".to_owned(),
                            media_type: image.mime_type.clone().unwrap_or_else(|| media_type.to_owned()),
                            data: data.trim_end().to_owned(),
                        },
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MessagesContent::Blocks),
    }
}

/// Stream decoder tracking tool call positions across chunks
#[derive(Debug, Default)]
struct MessagesChunkDecoder {
    /// Number of tool calls opened so far
    tool_calls_seen: u32,
}

impl ChunkDecoder for MessagesChunkDecoder {
    fn decode_chunk(&mut self, chunk: &[u8]) -> Result<Vec<ChunkEvent>, AdapterError> {
        let event: MessagesStreamEvent = parse_body(chunk)?;
        let events = match event {
            MessagesStreamEvent::ContentBlockStart {
                content_block: StreamContentBlock::ToolUse { id, name },
                ..
            } => {
                let index = self.tool_calls_seen;
                self.tool_calls_seen += 1;
                vec![ChunkEvent::ToolCall(ToolCallDelta {
                    index,
                    id: Some(id),
                    name: Some(name),
                    arguments: None,
                })]
            }
            MessagesStreamEvent::ContentBlockDelta { delta, .. } => match delta {
                StreamDelta::TextDelta { text } if !text.is_empty() => vec![ChunkEvent::Text(text)],
                StreamDelta::InputJsonDelta { partial_json } if !partial_json.is_empty() => {
                    vec![ChunkEvent::ToolCall(ToolCallDelta {
                        index: self.tool_calls_seen.saturating_sub(1),
                        id: None,
                        name: None,
                        arguments: Some(partial_json),
                    })]
                }
                _ => Vec::new(),
            },
            MessagesStreamEvent::MessageDelta { delta } => {
                delta.stop_reason.map(ChunkEvent::Finish).into_iter().collect()
            }
            MessagesStreamEvent::Error { error } => vec![ChunkEvent::Error(error.message)],
            MessagesStreamEvent::ContentBlockStart { .. } | MessagesStreamEvent::Other => Vec::new(),
        };
        Ok(events)
    }
}
