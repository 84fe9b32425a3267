//! Model family classification
//!
//! A model id is matched against an ordered rule table; the first matching
//! rule decides the family. New families are supported by appending rules
//! and registering a codec, without touching existing codecs.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Wire-format family of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// Structured messages with typed content blocks
    MessagesStyle,
    /// Single linearized prompt with turn prefixes
    LegacyCompletionStyle,
    /// Role/content list with a generation field in the reply
    GenerationStyle,
    /// Text embedding models
    EmbeddingStyle,
    /// No rule matched
    Unknown,
}

impl ModelFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessagesStyle => "messages",
            Self::LegacyCompletionStyle => "legacy_completion",
            Self::GenerationStyle => "generation",
            Self::EmbeddingStyle => "embedding",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over a model id
#[derive(Debug, Clone)]
pub enum Pattern {
    Prefix(String),
    Contains(String),
    Regex(Regex),
}

impl Pattern {
    fn matches(&self, model_id: &str) -> bool {
        match self {
            Self::Prefix(prefix) => model_id.starts_with(prefix.as_str()),
            Self::Contains(needle) => model_id.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(model_id),
        }
    }
}

#[derive(Debug, Clone)]
struct FamilyRule {
    pattern: Pattern,
    family: ModelFamily,
}

/// Ordered `(pattern, family)` table, first match wins
#[derive(Debug, Clone, Default)]
pub struct FamilyTable {
    rules: Vec<FamilyRule>,
}

impl FamilyTable {
    /// Table with no rules; classifies everything as [`ModelFamily::Unknown`]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a rule after all existing ones
    #[must_use]
    pub fn with_rule(mut self, pattern: Pattern, family: ModelFamily) -> Self {
        self.rules.push(FamilyRule { pattern, family });
        self
    }

    /// Classify a model id
    pub fn classify(&self, model_id: &str) -> ModelFamily {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(model_id))
            .map_or(ModelFamily::Unknown, |rule| rule.family)
    }
}

impl FamilyTable {
    /// Rules for the families served out of the box
    pub fn builtin() -> Self {
        Self::empty()
            .with_rule(Pattern::Contains("anthropic.claude-v2".to_owned()), ModelFamily::LegacyCompletionStyle)
            .with_rule(
                Pattern::Contains("anthropic.claude-instant".to_owned()),
                ModelFamily::LegacyCompletionStyle,
            )
            .with_rule(Pattern::Contains("anthropic.claude".to_owned()), ModelFamily::MessagesStyle)
            // Cross-region inference profiles, e.g. `us.anthropic.claude-3-haiku...`
            .with_rule(Pattern::Contains(".anthropic.".to_owned()), ModelFamily::MessagesStyle)
            .with_rule(Pattern::Contains("meta.llama".to_owned()), ModelFamily::GenerationStyle)
            .with_rule(Pattern::Prefix("cohere.embed".to_owned()), ModelFamily::EmbeddingStyle)
    }
}

/// Classify a model id against the built-in table
pub fn classify(model_id: &str) -> ModelFamily {
    static TABLE: OnceLock<FamilyTable> = OnceLock::new();
    TABLE.get_or_init(FamilyTable::builtin).classify(model_id)
}
