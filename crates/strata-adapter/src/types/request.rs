use crate::error::AdapterError;

use super::message::{NormalizedMessage, ToolSpec};

/// Token limit applied when the caller omits one or sends zero
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Sampling temperature applied when the caller omits one or sends zero
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Family-independent chat request
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    /// Target model identifier
    pub model_id: String,
    /// Conversation messages in order
    pub messages: Vec<NormalizedMessage>,
    /// Maximum tokens to generate, always positive
    pub max_tokens: u32,
    /// Sampling temperature, never negative
    pub temperature: f32,
    /// Nucleus sampling parameter
    pub top_p: Option<f32>,
    /// Stop sequences, duplicates removed
    pub stop_sequences: Vec<String>,
    /// Tools the model may call
    pub tools: Vec<ToolSpec>,
}

impl NormalizedRequest {
    /// Build a request with defaults for every sampling parameter
    pub fn new(model_id: impl Into<String>, messages: Vec<NormalizedMessage>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: None,
            stop_sequences: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Apply a caller-supplied token limit, defaulting on absent or zero
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = match max_tokens {
            Some(0) | None => DEFAULT_MAX_TOKENS,
            Some(n) => n,
        };
        self
    }

    /// Apply a caller-supplied temperature, defaulting on absent or zero
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidInput`] for negative or non-finite values
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Result<Self, AdapterError> {
        self.temperature = match temperature {
            None => DEFAULT_TEMPERATURE,
            Some(t) if !t.is_finite() || t < 0.0 => {
                return Err(AdapterError::InvalidInput(format!(
                    "temperature must be non-negative, got {t}"
                )));
            }
            Some(t) if t <= 0.0 => DEFAULT_TEMPERATURE,
            Some(t) => t,
        };
        Ok(self)
    }

    /// Apply a nucleus parameter; zero counts as omitted
    #[must_use]
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p.filter(|p| *p > 0.0);
        self
    }

    /// Apply stop sequences, dropping repeats and keeping first-seen order
    #[must_use]
    pub fn with_stop_sequences<I>(mut self, stops: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for stop in stops {
            if !unique.contains(&stop) {
                unique.push(stop);
            }
        }
        self.stop_sequences = unique;
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn base() -> NormalizedRequest {
        NormalizedRequest::new("m", vec![NormalizedMessage::text(Role::User, "hi")])
    }

    #[test]
    fn zero_values_fall_back_to_defaults() {
        let request = base()
            .with_max_tokens(Some(0))
            .with_temperature(Some(0.0))
            .unwrap()
            .with_top_p(Some(0.0));
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!((request.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(request.top_p, None);
    }

    #[test]
    fn negative_temperature_is_rejected() {
        assert!(matches!(
            base().with_temperature(Some(-0.5)),
            Err(AdapterError::InvalidInput(_))
        ));
    }

    #[test]
    fn stop_sequences_are_deduplicated_in_order() {
        let request = base().with_stop_sequences(["b", "a", "b", "c", "a"].map(String::from));
        assert_eq!(request.stop_sequences, vec!["b", "a", "c"]);
    }
}
