//! Normalization of OpenAI message content into [`NormalizedContent`]

use serde_json::Value;

use crate::types::{ContentBlock, ImageRef, NormalizedContent};

/// Normalize raw message content
///
/// Total over every JSON value. Strings become text, arrays become block
/// lists with unrecognized block types dropped, `null` becomes empty text
/// and a lone object is treated as a one-element list. Any other scalar
/// is rendered as its JSON text.
pub fn normalize(raw: &Value) -> NormalizedContent {
    match raw {
        Value::Null => NormalizedContent::default(),
        Value::String(text) => NormalizedContent::Text(text.clone()),
        Value::Array(items) => NormalizedContent::Blocks(items.iter().filter_map(normalize_block).collect()),
        Value::Object(_) => NormalizedContent::Blocks(normalize_block(raw).into_iter().collect()),
        other => NormalizedContent::Text(other.to_string()),
    }
}

fn normalize_block(block: &Value) -> Option<ContentBlock> {
    match block.get("type").and_then(Value::as_str)? {
        "text" => {
            let text = block.get("text").and_then(Value::as_str).unwrap_or_default();
            Some(ContentBlock::Text(text.to_owned()))
        }
        "image_url" => {
            let url = match block.get("image_url")? {
                Value::String(url) => url.as_str(),
                Value::Object(inner) => inner.get("url").and_then(Value::as_str)?,
                _ => return None,
            };
            Some(ContentBlock::Image(ImageRef::new(url)))
        }
        other => {
            tracing::debug!(block_type = other, "dropping unrecognized content block");
            None
        }
    }
}
