//! Codec for Cohere embedding models

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use super::{EmbeddingCodec, FamilyPayload, parse_body};
use crate::error::AdapterError;
use crate::family::ModelFamily;
use crate::protocol::embedding::{EmbedRequest, EmbedResponse};
use crate::types::{EmbeddingValue, EmbeddingsRequest, EmbeddingsResult, EncodingFormat, Usage};

const INPUT_TYPE: &str = "search_document";
const TRUNCATE: &str = "END";

/// Coerce raw embeddings input into a text list
///
/// A string becomes a one-element list. A list keeps only its string
/// elements in order; everything else in it is dropped, possibly leaving
/// the list empty.
///
/// # Errors
///
/// Returns [`AdapterError::InvalidInput`] when the input is neither a string
/// nor a list.
pub fn coerce_texts(input: &Value) -> Result<Vec<String>, AdapterError> {
    match input {
        Value::String(text) => Ok(vec![text.clone()]),
        Value::Array(items) => {
            let texts: Vec<String> = items.iter().filter_map(Value::as_str).map(str::to_owned).collect();
            if texts.len() < items.len() {
                tracing::debug!(
                    dropped = items.len() - texts.len(),
                    "dropping non-string embeddings inputs"
                );
            }
            Ok(texts)
        }
        _ => Err(AdapterError::InvalidInput(
            "unsupported input format for embeddings".to_owned(),
        )),
    }
}

/// Encode one vector in the requested format
///
/// Base64 output is the standard base64 of the vector's JSON text.
fn encode_vector(vector: Vec<f64>, encoding: EncodingFormat) -> Result<EmbeddingValue, AdapterError> {
    match encoding {
        EncodingFormat::Float => Ok(EmbeddingValue::Float(vector)),
        EncodingFormat::Base64 => {
            let json = serde_json::to_vec(&vector).map_err(AdapterError::malformed)?;
            Ok(EmbeddingValue::Base64(STANDARD.encode(json)))
        }
    }
}

/// Cohere embed codec
#[derive(Debug, Clone, Copy, Default)]
pub struct CohereEmbeddingCodec;

impl EmbeddingCodec for CohereEmbeddingCodec {
    fn family(&self) -> ModelFamily {
        ModelFamily::EmbeddingStyle
    }

    fn encode(&self, request: &EmbeddingsRequest) -> Result<FamilyPayload, AdapterError> {
        let body = EmbedRequest {
            texts: coerce_texts(&request.input)?,
            input_type: INPUT_TYPE.to_owned(),
            truncate: TRUNCATE.to_owned(),
        };
        FamilyPayload::json(&body)
    }

    fn decode(&self, model_id: &str, body: &[u8], encoding: EncodingFormat) -> Result<EmbeddingsResult, AdapterError> {
        let response: EmbedResponse = parse_body(body)?;
        let embeddings = response
            .embeddings
            .into_iter()
            .map(|vector| encode_vector(vector, encoding))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingsResult {
            model_id: model_id.to_owned(),
            embeddings,
            usage: Usage::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_input_becomes_single_text() {
        assert_eq!(coerce_texts(&json!("hello")).unwrap(), vec!["hello"]);
    }

    #[test]
    fn list_keeps_only_strings_in_order() {
        assert_eq!(coerce_texts(&json!(["a", 1, "b", null])).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn list_without_strings_coerces_to_empty() {
        assert!(coerce_texts(&json!([1, 2])).unwrap().is_empty());
        assert!(coerce_texts(&json!([[5]])).unwrap().is_empty());
    }

    #[test]
    fn other_shapes_are_invalid() {
        for input in [json!(42), json!({"text": "a"}), json!(null)] {
            assert!(matches!(coerce_texts(&input), Err(AdapterError::InvalidInput(_))), "{input}");
        }
    }

    #[test]
    fn encode_emits_cohere_body() {
        let request = EmbeddingsRequest {
            model_id: "cohere.embed-english-v3".to_owned(),
            input: json!(["x", "y"]),
            encoding: EncodingFormat::Float,
        };
        let body: Value = serde_json::from_slice(CohereEmbeddingCodec.encode(&request).unwrap().as_bytes()).unwrap();
        assert_eq!(
            body,
            json!({"texts": ["x", "y"], "input_type": "search_document", "truncate": "END"})
        );
    }

    #[test]
    fn float_decode_passes_vectors_through() {
        let result = CohereEmbeddingCodec
            .decode("m", br#"{"embeddings":[[0.1,0.2],[0.3]]}"#, EncodingFormat::Float)
            .unwrap();
        assert_eq!(
            result.embeddings,
            vec![EmbeddingValue::Float(vec![0.1, 0.2]), EmbeddingValue::Float(vec![0.3])]
        );
    }

    #[test]
    fn base64_decode_encodes_each_vector_json() {
        let result = CohereEmbeddingCodec
            .decode("m", br#"{"embeddings":[[0.5,0.25]]}"#, EncodingFormat::Base64)
            .unwrap();
        let EmbeddingValue::Base64(encoded) = &result.embeddings[0] else {
            panic!("expected base64");
        };
        let decoded: Vec<f64> = serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, vec![0.5, 0.25]);
    }

    #[test]
    fn missing_embeddings_field_is_malformed() {
        assert!(matches!(
            CohereEmbeddingCodec.decode("m", br#"{"id":"x"}"#, EncodingFormat::Float),
            Err(AdapterError::MalformedUpstreamResponse(_))
        ));
    }
}
