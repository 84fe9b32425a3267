use super::message::ToolCall;

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub const fn total_tokens(self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Family-independent chat completion result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedChatResult {
    /// Model that produced the result
    pub model_id: String,
    /// Generated text
    pub text: String,
    /// Tool calls requested by the model, in order
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason in the OpenAI vocabulary
    pub finish_reason: Option<String>,
    /// Token usage when the upstream reports it
    pub usage: Option<Usage>,
}
