//! AWS Bedrock implementation of [`InferenceRuntime`]
//!
//! Model invocation goes through the runtime client; model and inference
//! profile listings go through the control-plane client. Both share one
//! loaded AWS configuration.

use async_trait::async_trait;
use aws_sdk_bedrock::types::{InferenceProfileType, ModelModality};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::ResponseStream;
use aws_smithy_types::error::display::DisplayErrorContext;
use secrecy::ExposeSecret;
use strata_config::BedrockConfig;

use crate::error::AdapterError;
use crate::runtime::{
    ChunkStream, FoundationModelSummary, InferenceProfileSummary, InferenceRuntime, OutputModality, ProfileType,
};

/// Bedrock runtime and control-plane clients
#[derive(Debug, Clone)]
pub struct BedrockRuntime {
    runtime: aws_sdk_bedrockruntime::Client,
    control: aws_sdk_bedrock::Client,
}

impl BedrockRuntime {
    /// Build both clients from configuration
    ///
    /// Static credentials are used when configured; otherwise the default
    /// AWS credential chain applies.
    pub async fn from_config(config: &BedrockConfig) -> Self {
        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key_id, &config.secret_access_key) {
            let credentials = aws_credential_types::Credentials::new(
                access_key.expose_secret(),
                secret_key.expose_secret(),
                None, // session token
                None, // expiry
                "strata-config",
            );
            aws_config_builder = aws_config_builder.credentials_provider(credentials);
        }

        let aws_config = aws_config_builder.load().await;
        tracing::debug!(region = %config.region, "bedrock clients configured");

        Self {
            runtime: aws_sdk_bedrockruntime::Client::new(&aws_config),
            control: aws_sdk_bedrock::Client::new(&aws_config),
        }
    }
}

fn transport_error(operation: &str, error: &impl std::error::Error) -> AdapterError {
    let message = DisplayErrorContext(error).to_string();
    tracing::error!(operation, error = %message, "bedrock call failed");
    AdapterError::Transport(message)
}

#[async_trait]
impl InferenceRuntime for BedrockRuntime {
    async fn invoke(&self, model_id: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, AdapterError> {
        let output = self
            .runtime
            .invoke_model()
            .model_id(model_id)
            .content_type(content_type)
            .accept(content_type)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| transport_error("invoke_model", &e))?;

        Ok(output.body.into_inner())
    }

    async fn invoke_stream(
        &self,
        model_id: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<ChunkStream, AdapterError> {
        let output = self
            .runtime
            .invoke_model_with_response_stream()
            .model_id(model_id)
            .content_type(content_type)
            .accept(content_type)
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| transport_error("invoke_model_with_response_stream", &e))?;

        // Dropping the stream drops the receiver, which closes the upstream
        let stream = futures_util::stream::unfold(Some(output.body), |receiver| async move {
            let mut receiver = receiver?;
            loop {
                match receiver.recv().await {
                    Ok(Some(ResponseStream::Chunk(part))) => {
                        let Some(bytes) = part.bytes else { continue };
                        return Some((Ok(bytes.into_inner()), Some(receiver)));
                    }
                    Ok(Some(other)) => {
                        tracing::debug!(event = ?other, "ignoring non-chunk stream event");
                    }
                    Ok(None) => return None,
                    Err(e) => return Some((Err(transport_error("response_stream", &e)), None)),
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn list_foundation_models(
        &self,
        modality: OutputModality,
    ) -> Result<Vec<FoundationModelSummary>, AdapterError> {
        let modality = match modality {
            OutputModality::Text => ModelModality::Text,
            OutputModality::Embedding => ModelModality::Embedding,
            OutputModality::Image => ModelModality::Image,
        };

        let output = self
            .control
            .list_foundation_models()
            .by_output_modality(modality)
            .send()
            .await
            .map_err(|e| transport_error("list_foundation_models", &e))?;

        Ok(output
            .model_summaries()
            .iter()
            .map(|m| FoundationModelSummary {
                model_id: m.model_id().to_owned(),
                lifecycle_status: m.model_lifecycle().map(|l| l.status().as_str().to_owned()),
                streaming_supported: m.response_streaming_supported().unwrap_or(false),
            })
            .collect())
    }

    async fn list_inference_profiles(
        &self,
        profile_type: ProfileType,
        max_results: i32,
    ) -> Result<Vec<InferenceProfileSummary>, AdapterError> {
        let profile_type = match profile_type {
            ProfileType::SystemDefined => InferenceProfileType::SystemDefined,
            ProfileType::Application => InferenceProfileType::Application,
        };

        let output = self
            .control
            .list_inference_profiles()
            .max_results(max_results)
            .type_equals(profile_type)
            .send()
            .await
            .map_err(|e| transport_error("list_inference_profiles", &e))?;

        Ok(output
            .inference_profile_summaries()
            .iter()
            .map(|p| InferenceProfileSummary {
                profile_id: p.inference_profile_id().to_owned(),
                status: Some(p.status().as_str().to_owned()),
            })
            .collect())
    }
}
