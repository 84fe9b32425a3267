//! Mapping of upstream stop reasons onto the OpenAI vocabulary

/// Map an upstream stop reason
///
/// Case-insensitive. Unmapped reasons pass through lower-cased and an
/// empty reason maps to `None`.
pub fn map_finish_reason(raw: &str) -> Option<String> {
    let reason = raw.trim().to_ascii_lowercase();
    let mapped = match reason.as_str() {
        "" => return None,
        "tool_use" => "tool_calls",
        "finished" | "end_turn" | "stop_sequence" | "complete" | "stop" => "stop",
        "max_tokens" | "length" => "length",
        "content_filtered" => "content_filter",
        _ => return Some(reason),
    };
    Some(mapped.to_owned())
}

/// Map an optional stop reason, treating absence like an empty string
pub fn map_optional(raw: Option<&str>) -> Option<String> {
    raw.and_then(map_finish_reason)
}
