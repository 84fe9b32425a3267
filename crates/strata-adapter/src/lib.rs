//! Model adapter layer for Strata
//!
//! Translates OpenAI-dialect chat and embeddings requests into the
//! per-family wire formats of AWS Bedrock models and back. Families are
//! resolved from the model id through an ordered pattern table, and each
//! family owns a codec registered in a [`CodecRegistry`].

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod bedrock;
pub mod catalog;
pub mod codec;
pub mod content;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod family;
pub mod finish;
#[cfg(feature = "http")]
mod handler;
pub mod image;
pub mod protocol;
pub mod runtime;
pub mod stream;
pub mod types;

pub use bedrock::BedrockRuntime;
pub use catalog::{CatalogEntry, CatalogSources, build_catalog};
pub use codec::{ChatCodec, CodecRegistry, EmbeddingCodec, FamilyPayload};
pub use dispatch::Adapter;
pub use error::AdapterError;
pub use family::{ModelFamily, classify};
pub use finish::map_finish_reason;
pub use image::{HttpImageFetcher, ImageFetcher};
#[cfg(feature = "http")]
pub use handler::{AdapterState, adapter_router};
pub use runtime::InferenceRuntime;
pub use stream::StreamTranslator;
pub use types::{
    EmbeddingsRequest, EmbeddingsResult, NormalizedChatResult, NormalizedContent, NormalizedMessage,
    NormalizedRequest, Role, StreamEvent,
};
