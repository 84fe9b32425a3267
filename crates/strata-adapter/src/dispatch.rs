//! Entry points tying classification, codecs and transport together

use std::sync::Arc;

use strata_core::RequestContext;

use crate::catalog::{CatalogEntry, CatalogSources, build_catalog_from};
use crate::codec::{ChatCodec, CodecRegistry};
use crate::error::AdapterError;
use crate::image::{ImageFetcher, split_data_uri};
use crate::runtime::{InferenceRuntime, JSON_CONTENT_TYPE};
use crate::stream::StreamTranslator;
use crate::types::{
    ContentBlock, EmbeddingsRequest, EmbeddingsResult, NormalizedChatResult, NormalizedContent, NormalizedRequest,
};

/// Model adapter shared by all requests
///
/// Cheap to clone; every clone shares the same runtime, fetcher and codecs.
#[derive(Clone)]
pub struct Adapter {
    runtime: Arc<dyn InferenceRuntime>,
    images: Arc<dyn ImageFetcher>,
    codecs: Arc<CodecRegistry>,
    embedding_models: Arc<[String]>,
    catalog_sources: CatalogSources,
}

impl Adapter {
    /// Adapter with the built-in codecs and no embedding models enabled
    pub fn new(runtime: Arc<dyn InferenceRuntime>, images: Arc<dyn ImageFetcher>) -> Self {
        Self {
            runtime,
            images,
            codecs: Arc::new(CodecRegistry::builtin()),
            embedding_models: Arc::from(Vec::new()),
            catalog_sources: CatalogSources::default(),
        }
    }

    /// Replace the codec registry
    #[must_use]
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = Arc::new(codecs);
        self
    }

    /// Set the embedding models accepted by [`Adapter::handle_embeddings`]
    #[must_use]
    pub fn with_embedding_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.embedding_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Choose which listings feed [`Adapter::list_models`]
    #[must_use]
    pub fn with_catalog_sources(mut self, sources: CatalogSources) -> Self {
        self.catalog_sources = sources;
        self
    }

    /// Run a chat request to completion
    ///
    /// # Errors
    ///
    /// [`AdapterError::UnsupportedModel`] is returned before any upstream call
    /// when the model has no chat codec. Otherwise encoding, image, transport
    /// and decoding failures propagate unchanged.
    pub async fn handle_chat(&self, request: NormalizedRequest) -> Result<NormalizedChatResult, AdapterError> {
        let codec = self.codecs.chat_codec(&request.model_id)?;
        let request = self.resolve_images(request, codec.as_ref()).await?;
        let payload = codec.encode(&request)?;

        tracing::debug!(model = %request.model_id, family = %codec.family(), "invoking model");
        let body = self
            .runtime
            .invoke(&request.model_id, JSON_CONTENT_TYPE, payload.into_bytes())
            .await?;

        codec.decode(&request.model_id, &body)
    }

    /// Open a streaming chat request
    ///
    /// The returned translator stops when the context is cancelled.
    ///
    /// # Errors
    ///
    /// Same as [`Adapter::handle_chat`] up to the point the stream is opened.
    /// Failures after that arrive as a terminal [`crate::StreamEvent::Error`].
    pub async fn handle_chat_stream(
        &self,
        request: NormalizedRequest,
        context: &RequestContext,
    ) -> Result<StreamTranslator, AdapterError> {
        let codec = self.codecs.chat_codec(&request.model_id)?;
        let request = self.resolve_images(request, codec.as_ref()).await?;
        let payload = codec.encode(&request)?;

        tracing::debug!(
            model = %request.model_id,
            family = %codec.family(),
            request_id = %context.request_id,
            "opening model stream"
        );
        let upstream = self
            .runtime
            .invoke_stream(&request.model_id, JSON_CONTENT_TYPE, payload.into_bytes())
            .await?;

        Ok(StreamTranslator::new(
            request.model_id,
            upstream,
            codec.stream_decoder(),
            context.cancellation.clone(),
        ))
    }

    /// Compute embeddings
    ///
    /// # Errors
    ///
    /// [`AdapterError::UnsupportedModel`] when the model is not an enabled
    /// embedding model or has no embedding codec.
    pub async fn handle_embeddings(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResult, AdapterError> {
        if !self.embedding_models.iter().any(|m| *m == request.model_id) {
            return Err(AdapterError::unsupported(&request.model_id));
        }
        let codec = self.codecs.embedding_codec(&request.model_id)?;
        let payload = codec.encode(&request)?;

        tracing::debug!(model = %request.model_id, "invoking embedding model");
        let body = self
            .runtime
            .invoke(&request.model_id, JSON_CONTENT_TYPE, payload.into_bytes())
            .await?;

        codec.decode(&request.model_id, &body, request.encoding)
    }

    /// List the models this gateway can serve
    ///
    /// # Errors
    ///
    /// Fails if any upstream listing fails.
    pub async fn list_models(&self) -> Result<Vec<CatalogEntry>, AdapterError> {
        build_catalog_from(self.runtime.as_ref(), self.catalog_sources).await
    }

    /// Turn every image into an inline data URI for codecs that keep images
    async fn resolve_images(
        &self,
        mut request: NormalizedRequest,
        codec: &dyn ChatCodec,
    ) -> Result<NormalizedRequest, AdapterError> {
        if !codec.accepts_images() {
            if request.messages.iter().any(|m| m.content.has_images()) {
                tracing::debug!(
                    model = %request.model_id,
                    family = %codec.family(),
                    "family is text-only, ignoring image blocks"
                );
            }
            return Ok(request);
        }

        for message in &mut request.messages {
            let NormalizedContent::Blocks(blocks) = &mut message.content else {
                continue;
            };
            for block in blocks {
                let ContentBlock::Image(image) = block else {
                    continue;
                };
                if image.is_inline() {
                    let (mime_type, _) = split_data_uri(&image.url)
                        .ok_or_else(|| AdapterError::InvalidInput("unsupported inline image URI".to_owned()))?;
                    image.mime_type = Some(mime_type.to_owned());
                } else {
                    let fetched = self.images.fetch(&image.url).await?;
                    image.url = fetched.to_data_uri();
                    image.mime_type = Some(fetched.mime_type);
                }
            }
        }
        Ok(request)
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("codecs", &self.codecs)
            .field("embedding_models", &self.embedding_models)
            .field("catalog_sources", &self.catalog_sources)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures_util::StreamExt;
    use serde_json::{Value, json};

    use super::*;
    use crate::image::FetchedImage;
    use crate::runtime::{ChunkStream, FoundationModelSummary, InferenceProfileSummary, OutputModality, ProfileType};
    use crate::types::{EncodingFormat, ImageRef, NormalizedMessage, Role, StreamEvent};

    /// Runtime answering every invoke with a fixed body, recording requests
    #[derive(Default)]
    struct FixedRuntime {
        reply: Vec<u8>,
        chunks: Vec<Vec<u8>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FixedRuntime {
        fn replying(reply: &Value) -> Self {
            Self {
                reply: reply.to_string().into_bytes(),
                ..Self::default()
            }
        }

        fn record(&self, model_id: &str, body: &[u8]) {
            let body = serde_json::from_slice(body).unwrap();
            self.calls.lock().unwrap().push((model_id.to_owned(), body));
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceRuntime for FixedRuntime {
        async fn invoke(&self, model_id: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, AdapterError> {
            assert_eq!(content_type, JSON_CONTENT_TYPE);
            self.record(model_id, &body);
            Ok(self.reply.clone())
        }

        async fn invoke_stream(&self, model_id: &str, _: &str, body: Vec<u8>) -> Result<ChunkStream, AdapterError> {
            self.record(model_id, &body);
            Ok(Box::pin(futures_util::stream::iter(self.chunks.clone().into_iter().map(Ok))))
        }

        async fn list_foundation_models(&self, _: OutputModality) -> Result<Vec<FoundationModelSummary>, AdapterError> {
            Ok(Vec::new())
        }

        async fn list_inference_profiles(
            &self,
            _: ProfileType,
            _: i32,
        ) -> Result<Vec<InferenceProfileSummary>, AdapterError> {
            Ok(vec![InferenceProfileSummary {
                profile_id: "us.meta.llama3-2-1b-instruct-v1:0".to_owned(),
                status: None,
            }])
        }
    }

    struct StubImages;

    #[async_trait]
    impl ImageFetcher for StubImages {
        async fn fetch(&self, url: &str) -> Result<FetchedImage, AdapterError> {
            if url.contains("missing") {
                return Err(AdapterError::Fetch("status: 404 Not Found".to_owned()));
            }
            Ok(FetchedImage {
                bytes: b"img".to_vec(),
                mime_type: "image/webp".to_owned(),
            })
        }
    }

    fn adapter(runtime: &Arc<FixedRuntime>) -> Adapter {
        Adapter::new(Arc::clone(runtime) as Arc<dyn InferenceRuntime>, Arc::new(StubImages))
            .with_embedding_models(["cohere.embed-english-v3"])
    }

    fn chat(model: &str, messages: Vec<NormalizedMessage>) -> NormalizedRequest {
        NormalizedRequest::new(model, messages)
    }

    #[tokio::test]
    async fn unsupported_model_never_reaches_transport() {
        let runtime = Arc::new(FixedRuntime::default());
        let err = adapter(&runtime)
            .handle_chat(chat("ai21.j2-mid", vec![NormalizedMessage::text(Role::User, "hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedModel { .. }));
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn chat_encodes_invokes_and_decodes() {
        let runtime = Arc::new(FixedRuntime::replying(
            &json!({"content": [{"type": "text", "text": "Hello"}], "stop_reason": "end_turn"}),
        ));
        let result = adapter(&runtime)
            .handle_chat(chat(
                "anthropic.claude-3-haiku-20240307-v1:0",
                vec![NormalizedMessage::text(Role::User, "Hi")],
            ))
            .await
            .unwrap();
        assert_eq!(result.text, "Hello");
        assert_eq!(result.finish_reason.as_deref(), Some("stop"));

        let calls = runtime.calls();
        assert_eq!(calls[0].0, "anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(calls[0].1["anthropic_version"], "bedrock-2023-05-31");
    }

    #[tokio::test]
    async fn remote_images_are_inlined_before_encoding() {
        let runtime = Arc::new(FixedRuntime::replying(&json!({"content": []})));
        let user = NormalizedMessage {
            content: NormalizedContent::Blocks(vec![ContentBlock::Image(ImageRef::new("https://img.example/a"))]),
            ..NormalizedMessage::text(Role::User, "")
        };
        adapter(&runtime)
            .handle_chat(chat("anthropic.claude-3-haiku", vec![user]))
            .await
            .unwrap();
        let source = &runtime.calls()[0].1["messages"][0]["content"][0]["source"];
        assert_eq!(source["media_type"], "image/webp");
        assert_eq!(source["data"], "aW1n");
    }

    #[tokio::test]
    async fn image_fetch_failure_surfaces() {
        let runtime = Arc::new(FixedRuntime::default());
        let user = NormalizedMessage {
            content: NormalizedContent::Blocks(vec![ContentBlock::Image(ImageRef::new("https://img.example/missing"))]),
            ..NormalizedMessage::text(Role::User, "")
        };
        let err = adapter(&runtime)
            .handle_chat(chat("anthropic.claude-3-haiku", vec![user]))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Fetch(_)));
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn text_only_family_never_fetches_images() {
        let runtime = Arc::new(FixedRuntime::replying(&json!({"generation": "ok", "stop_reason": "stop"})));
        let user = NormalizedMessage {
            content: NormalizedContent::Blocks(vec![
                ContentBlock::Text("describe".to_owned()),
                ContentBlock::Image(ImageRef::new("https://img.example/missing")),
            ]),
            ..NormalizedMessage::text(Role::User, "")
        };
        let result = adapter(&runtime)
            .handle_chat(chat("meta.llama3-8b-instruct-v1:0", vec![user]))
            .await
            .unwrap();
        assert_eq!(result.text, "ok");
        assert_eq!(runtime.calls()[0].1["messages"][0]["content"], "describe");
    }

    #[tokio::test]
    async fn stream_uses_family_decoder() {
        let runtime = Arc::new(FixedRuntime {
            chunks: vec![
                br#"{"generation":"Hi","stop_reason":null}"#.to_vec(),
                br#"{"generation":"","stop_reason":"stop"}"#.to_vec(),
            ],
            ..FixedRuntime::default()
        });
        let translator = adapter(&runtime)
            .handle_chat_stream(
                chat("meta.llama3-8b-instruct-v1:0", vec![NormalizedMessage::text(Role::User, "x")]),
                &RequestContext::detached(),
            )
            .await
            .unwrap();
        let events: Vec<StreamEvent> = translator.into_stream().collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextDelta("Hi".to_owned()),
                StreamEvent::FinishReason("stop".to_owned()),
            ]
        );
        assert_eq!(runtime.calls()[0].1["max_gen_len"], 2048);
    }

    #[tokio::test]
    async fn embeddings_require_enabled_model() {
        let runtime = Arc::new(FixedRuntime::replying(&json!({"embeddings": [[1.0, 2.0]]})));
        let adapter = adapter(&runtime);

        let err = adapter
            .handle_embeddings(EmbeddingsRequest {
                model_id: "cohere.embed-multilingual-v3".to_owned(),
                input: json!("x"),
                encoding: EncodingFormat::Float,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedModel { .. }));

        let result = adapter
            .handle_embeddings(EmbeddingsRequest {
                model_id: "cohere.embed-english-v3".to_owned(),
                input: json!(["x"]),
                encoding: EncodingFormat::Float,
            })
            .await
            .unwrap();
        assert_eq!(result.embeddings.len(), 1);
        assert_eq!(runtime.calls()[0].1["texts"], json!(["x"]));
    }

    #[tokio::test]
    async fn list_models_follows_catalog_sources() {
        let runtime = Arc::new(FixedRuntime::default());
        assert_eq!(adapter(&runtime).list_models().await.unwrap().len(), 1);
        let without_profiles = adapter(&runtime).with_catalog_sources(CatalogSources {
            inference_profiles: false,
        });
        assert!(without_profiles.list_models().await.unwrap().is_empty());
    }
}
