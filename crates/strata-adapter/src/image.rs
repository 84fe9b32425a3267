//! Image resolution for multimodal requests
//!
//! Inline `data:` URIs are decoded locally; remote URLs are fetched over
//! HTTP. Codecs only ever see inline images.

use std::sync::OnceLock;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::AdapterError;

/// MIME type assumed when a server does not report an image type
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Raw image bytes with their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl FetchedImage {
    /// Re-encode as a `data:<mime>;base64,<payload>` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

fn data_uri_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"^data:(image/[a-z]*);base64,\s*").expect("valid data URI pattern"))
}

/// Split an inline image URI into its MIME type and base64 payload
///
/// Returns `None` when the URI is not a base64 image data URI. The payload
/// is not validated.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let captures = data_uri_prefix().captures(uri)?;
    let mime_type = captures.get(1)?.as_str();
    let prefix_len = captures.get(0)?.end();
    Some((mime_type, &uri[prefix_len..]))
}

/// Decode an inline image URI
///
/// # Errors
///
/// Returns [`AdapterError::InvalidInput`] when the URI is not a base64 image
/// data URI or the payload is not valid base64.
pub fn decode_data_uri(uri: &str) -> Result<FetchedImage, AdapterError> {
    let (mime_type, payload) =
        split_data_uri(uri).ok_or_else(|| AdapterError::InvalidInput("unsupported inline image URI".to_owned()))?;
    let bytes = STANDARD
        .decode(payload.trim_end())
        .map_err(|e| AdapterError::InvalidInput(format!("invalid base64 image payload: {e}")))?;
    Ok(FetchedImage {
        bytes,
        mime_type: mime_type.to_owned(),
    })
}

/// Source of image bytes for a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Resolve a remote or inline image URL
    async fn fetch(&self, url: &str) -> Result<FetchedImage, AdapterError>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, AdapterError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        let parsed = url::Url::parse(url).map_err(|e| AdapterError::Fetch(format!("invalid image URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AdapterError::Fetch(format!(
                "unsupported image URL scheme `{}`",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AdapterError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Fetch(format!("unable to access the image URL, status: {status}")));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim())
            .filter(|v| v.starts_with("image"))
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_owned();

        let bytes = response.bytes().await.map_err(|e| AdapterError::Fetch(e.to_string()))?;
        tracing::debug!(url, mime_type, size = bytes.len(), "fetched remote image");

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}
