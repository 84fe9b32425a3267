//! Scripted in-memory inference runtime
//!
//! Replies are registered per model id; every invocation is recorded so
//! tests can assert on the exact body each family codec produced.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use strata_adapter::AdapterError;
use strata_adapter::runtime::{
    ChunkStream, FoundationModelSummary, InferenceProfileSummary, InferenceRuntime, OutputModality, ProfileType,
};

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub model_id: String,
    pub streaming: bool,
    pub body: serde_json::Value,
}

/// Scripted chunk; `Err` simulates a mid-stream transport failure
pub type ScriptedChunk = Result<serde_json::Value, String>;

#[derive(Default)]
pub struct ScriptedRuntime {
    replies: HashMap<String, serde_json::Value>,
    streams: HashMap<String, Vec<ScriptedChunk>>,
    models: Vec<FoundationModelSummary>,
    profiles: Vec<InferenceProfileSummary>,
    failing_listings: bool,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `invoke` for `model_id` with `body`
    pub fn with_reply(mut self, model_id: &str, body: serde_json::Value) -> Self {
        self.replies.insert(model_id.to_owned(), body);
        self
    }

    /// Reply to `invoke_stream` for `model_id` with `chunks`
    pub fn with_stream(mut self, model_id: &str, chunks: Vec<ScriptedChunk>) -> Self {
        self.streams.insert(model_id.to_owned(), chunks);
        self
    }

    /// Add a foundation model to the control-plane listing
    pub fn with_foundation_model(mut self, model_id: &str, status: &str, streaming: bool) -> Self {
        self.models.push(FoundationModelSummary {
            model_id: model_id.to_owned(),
            lifecycle_status: Some(status.to_owned()),
            streaming_supported: streaming,
        });
        self
    }

    /// Add a system-defined inference profile to the listing
    pub fn with_profile(mut self, profile_id: &str) -> Self {
        self.profiles.push(InferenceProfileSummary {
            profile_id: profile_id.to_owned(),
            status: Some("ACTIVE".to_owned()),
        });
        self
    }

    /// Make every listing call fail
    pub fn with_failing_listings(mut self) -> Self {
        self.failing_listings = true;
        self
    }

    /// Invocations recorded so far
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn record(&self, model_id: &str, streaming: bool, body: &[u8]) {
        let body = serde_json::from_slice(body).expect("adapter sends JSON bodies");
        self.invocations.lock().unwrap().push(Invocation {
            model_id: model_id.to_owned(),
            streaming,
            body,
        });
    }
}

#[async_trait]
impl InferenceRuntime for ScriptedRuntime {
    async fn invoke(&self, model_id: &str, _content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, AdapterError> {
        self.record(model_id, false, &body);
        self.replies
            .get(model_id)
            .map(|reply| reply.to_string().into_bytes())
            .ok_or_else(|| AdapterError::Transport(format!("no scripted reply for {model_id}")))
    }

    async fn invoke_stream(
        &self,
        model_id: &str,
        _content_type: &str,
        body: Vec<u8>,
    ) -> Result<ChunkStream, AdapterError> {
        self.record(model_id, true, &body);
        let chunks = self
            .streams
            .get(model_id)
            .cloned()
            .ok_or_else(|| AdapterError::Transport(format!("no scripted stream for {model_id}")))?;
        let items = chunks.into_iter().map(|chunk| {
            chunk
                .map(|value| value.to_string().into_bytes())
                .map_err(AdapterError::Transport)
        });
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    async fn list_foundation_models(
        &self,
        _modality: OutputModality,
    ) -> Result<Vec<FoundationModelSummary>, AdapterError> {
        if self.failing_listings {
            return Err(AdapterError::Transport("AccessDeniedException".to_owned()));
        }
        Ok(self.models.clone())
    }

    async fn list_inference_profiles(
        &self,
        _profile_type: ProfileType,
        _max_results: i32,
    ) -> Result<Vec<InferenceProfileSummary>, AdapterError> {
        if self.failing_listings {
            return Err(AdapterError::Transport("AccessDeniedException".to_owned()));
        }
        Ok(self.profiles.clone())
    }
}
