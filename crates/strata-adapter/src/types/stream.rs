/// Incremental fragment of a tool call in a stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallDelta {
    /// Position of the tool call within the response
    pub index: u32,
    /// Tool call ID, present on the first fragment
    pub id: Option<String>,
    /// Function name, present on the first fragment
    pub name: Option<String>,
    /// Argument JSON fragment
    pub arguments: Option<String>,
}

/// Event emitted by the streaming translator
///
/// `FinishReason` and `Error` are terminal: no event follows either one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text fragment
    TextDelta(String),
    /// Tool call fragment
    ToolCallDelta(ToolCallDelta),
    /// Stream finished with a mapped reason
    FinishReason(String),
    /// Stream failed after delivering every earlier event
    Error(String),
}

impl StreamEvent {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::FinishReason(_) | Self::Error(_))
    }
}
