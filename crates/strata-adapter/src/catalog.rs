//! Model catalog reconciliation
//!
//! Lists foundation models and system-defined inference profiles and merges
//! them into one flat catalog.

use crate::error::AdapterError;
use crate::runtime::{InferenceRuntime, OutputModality, ProfileType};

/// Page size requested for inference profile listings
pub const PROFILE_PAGE_SIZE: i32 = 1000;

const ACTIVE: &str = "ACTIVE";

/// One model the gateway can serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub model_id: String,
    /// Provider prefix of the id, before the first `.`
    pub owner: String,
}

impl CatalogEntry {
    pub fn new(model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        let owner = model_id.split('.').next().unwrap_or_default().to_owned();
        Self { model_id, owner }
    }
}

/// Which listings feed the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSources {
    /// Append system-defined inference profiles
    pub inference_profiles: bool,
}

impl Default for CatalogSources {
    fn default() -> Self {
        Self {
            inference_profiles: true,
        }
    }
}

/// Build the catalog from foundation models and inference profiles
///
/// Foundation models are kept only when `ACTIVE` and stream-capable;
/// inference profiles are appended unconditionally. No deduplication.
///
/// # Errors
///
/// Fails as a whole if either listing fails.
pub async fn build_catalog(runtime: &dyn InferenceRuntime) -> Result<Vec<CatalogEntry>, AdapterError> {
    build_catalog_from(runtime, CatalogSources::default()).await
}

/// [`build_catalog`] with explicit sources
///
/// # Errors
///
/// Fails as a whole if any requested listing fails.
pub async fn build_catalog_from(
    runtime: &dyn InferenceRuntime,
    sources: CatalogSources,
) -> Result<Vec<CatalogEntry>, AdapterError> {
    let profiles = async {
        if sources.inference_profiles {
            runtime
                .list_inference_profiles(ProfileType::SystemDefined, PROFILE_PAGE_SIZE)
                .await
        } else {
            Ok(Vec::new())
        }
    };
    let (models, profiles) = tokio::try_join!(runtime.list_foundation_models(OutputModality::Text), profiles)?;

    let foundation_count = models.len();
    let mut catalog: Vec<CatalogEntry> = models
        .into_iter()
        .filter(|m| m.lifecycle_status.as_deref() == Some(ACTIVE) && m.streaming_supported)
        .map(|m| CatalogEntry::new(m.model_id))
        .collect();
    catalog.extend(profiles.into_iter().map(|p| CatalogEntry::new(p.profile_id)));

    tracing::debug!(foundation_count, entries = catalog.len(), "model catalog built");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::runtime::{ChunkStream, FoundationModelSummary, InferenceProfileSummary};

    struct Listings {
        models: Result<Vec<FoundationModelSummary>, String>,
        profiles: Result<Vec<InferenceProfileSummary>, String>,
    }

    #[async_trait]
    impl InferenceRuntime for Listings {
        async fn invoke(&self, _: &str, _: &str, _: Vec<u8>) -> Result<Vec<u8>, AdapterError> {
            unreachable!()
        }

        async fn invoke_stream(&self, _: &str, _: &str, _: Vec<u8>) -> Result<ChunkStream, AdapterError> {
            unreachable!()
        }

        async fn list_foundation_models(
            &self,
            modality: OutputModality,
        ) -> Result<Vec<FoundationModelSummary>, AdapterError> {
            assert_eq!(modality, OutputModality::Text);
            self.models.clone().map_err(AdapterError::Transport)
        }

        async fn list_inference_profiles(
            &self,
            profile_type: ProfileType,
            max_results: i32,
        ) -> Result<Vec<InferenceProfileSummary>, AdapterError> {
            assert_eq!(profile_type, ProfileType::SystemDefined);
            assert_eq!(max_results, 1000);
            self.profiles.clone().map_err(AdapterError::Transport)
        }
    }

    fn model(id: &str, status: Option<&str>, streaming: bool) -> FoundationModelSummary {
        FoundationModelSummary {
            model_id: id.to_owned(),
            lifecycle_status: status.map(str::to_owned),
            streaming_supported: streaming,
        }
    }

    fn profile(id: &str) -> InferenceProfileSummary {
        InferenceProfileSummary {
            profile_id: id.to_owned(),
            status: Some("ACTIVE".to_owned()),
        }
    }

    #[test]
    fn owner_is_prefix_before_first_dot() {
        assert_eq!(CatalogEntry::new("us.anthropic.claude-3").owner, "us");
        assert_eq!(CatalogEntry::new("meta.llama3").owner, "meta");
        assert_eq!(CatalogEntry::new("nodots").owner, "nodots");
    }

    #[tokio::test]
    async fn filters_models_and_appends_profiles() {
        let runtime = Listings {
            models: Ok(vec![
                model("anthropic.claude-3-haiku", Some("ACTIVE"), true),
                model("anthropic.claude-v1", Some("LEGACY"), true),
                model("amazon.titan-image", Some("ACTIVE"), false),
                model("ai21.unknown", None, true),
            ]),
            profiles: Ok(vec![profile("us.anthropic.claude-3-haiku"), profile("anthropic.claude-3-haiku")]),
        };
        let ids: Vec<String> = build_catalog(&runtime).await.unwrap().into_iter().map(|e| e.model_id).collect();
        assert_eq!(
            ids,
            vec!["anthropic.claude-3-haiku", "us.anthropic.claude-3-haiku", "anthropic.claude-3-haiku"]
        );
    }

    #[tokio::test]
    async fn either_listing_failure_fails_the_catalog() {
        let runtime = Listings {
            models: Ok(vec![model("a.b", Some("ACTIVE"), true)]),
            profiles: Err("denied".to_owned()),
        };
        assert!(matches!(build_catalog(&runtime).await, Err(AdapterError::Transport(_))));

        let runtime = Listings {
            models: Err("denied".to_owned()),
            profiles: Ok(Vec::new()),
        };
        assert!(build_catalog(&runtime).await.is_err());
    }

    #[tokio::test]
    async fn profiles_can_be_excluded() {
        let runtime = Listings {
            models: Ok(vec![model("a.b", Some("ACTIVE"), true)]),
            profiles: Err("not called".to_owned()),
        };
        let catalog = build_catalog_from(
            &runtime,
            CatalogSources {
                inference_profiles: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(catalog, vec![CatalogEntry::new("a.b")]);
    }
}
