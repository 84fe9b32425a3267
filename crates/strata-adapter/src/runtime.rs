//! Transport seam between the adapter and the inference service

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::AdapterError;

/// Content type of every request and response body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Raw upstream stream chunks, one JSON document each
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, AdapterError>> + Send>>;

/// Output modality filter for foundation model listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputModality {
    Text,
    Embedding,
    Image,
}

/// Inference profile type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    SystemDefined,
    Application,
}

/// Foundation model as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationModelSummary {
    pub model_id: String,
    /// Lifecycle status, e.g. `ACTIVE` or `LEGACY`
    pub lifecycle_status: Option<String>,
    pub streaming_supported: bool,
}

/// Inference profile as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceProfileSummary {
    pub profile_id: String,
    pub status: Option<String>,
}

/// Calls the adapter makes against the inference service
///
/// Implementations must be cheap to share; one instance serves every request.
#[async_trait]
pub trait InferenceRuntime: Send + Sync {
    /// Invoke a model and return the full response body
    async fn invoke(&self, model_id: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, AdapterError>;

    /// Invoke a model and return its response as a chunk stream
    async fn invoke_stream(
        &self,
        model_id: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<ChunkStream, AdapterError>;

    /// List foundation models producing the given modality
    async fn list_foundation_models(
        &self,
        modality: OutputModality,
    ) -> Result<Vec<FoundationModelSummary>, AdapterError>;

    /// List inference profiles of the given type
    async fn list_inference_profiles(
        &self,
        profile_type: ProfileType,
        max_results: i32,
    ) -> Result<Vec<InferenceProfileSummary>, AdapterError>;
}
