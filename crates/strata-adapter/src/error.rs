use http::StatusCode;
use strata_core::HttpError;
use thiserror::Error;

/// Errors produced by the adapter pipeline
///
/// Each kind stays distinct all the way to the HTTP layer so it can be
/// mapped to its own status code. Nothing here is retried.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Model id did not classify into a family with a matching codec
    #[error("unsupported model: {model}")]
    UnsupportedModel { model: String },

    /// Request content could not be coerced into the codec's accepted shapes
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Upstream call succeeded but the body was unparseable or incomplete
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// Network or service failure reported by the inference client
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote image retrieval failed
    #[error("image fetch failed: {0}")]
    Fetch(String),
}

impl AdapterError {
    pub(crate) fn unsupported(model: &str) -> Self {
        Self::UnsupportedModel {
            model: model.to_owned(),
        }
    }

    pub(crate) fn malformed(what: impl std::fmt::Display) -> Self {
        Self::MalformedUpstreamResponse(what.to_string())
    }
}

impl HttpError for AdapterError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedModel { .. } | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::MalformedUpstreamResponse(_) | Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::Fetch(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::UnsupportedModel { .. } => "unsupported_model",
            Self::InvalidInput(_) => "invalid_request_error",
            Self::MalformedUpstreamResponse(_) => "upstream_response_error",
            Self::Transport(_) => "upstream_error",
            Self::Fetch(_) => "image_fetch_error",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        assert_eq!(AdapterError::unsupported("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AdapterError::malformed("x").status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AdapterError::Fetch("x".to_owned()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_ne!(
            AdapterError::unsupported("x").error_type(),
            AdapterError::InvalidInput("x".to_owned()).error_type()
        );
        assert_ne!(
            AdapterError::malformed("x").error_type(),
            AdapterError::Transport("x".to_owned()).error_type()
        );
    }
}
