//! Axum route handlers for the OpenAI-compatible endpoints

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router, routing};
use futures_util::{Stream, StreamExt, stream};
use strata_core::{HttpError, RequestContext};

use crate::convert::openai as convert;
use crate::dispatch::Adapter;
use crate::error::AdapterError;
use crate::protocol::openai::{OpenAiEmbeddingsRequest, OpenAiErrorDetail, OpenAiErrorResponse, OpenAiRequest};
use crate::stream::StreamTranslator;
use crate::types::StreamEvent;

/// Shared state for adapter route handlers
#[derive(Debug, Clone)]
pub struct AdapterState {
    adapter: Adapter,
    default_model: Arc<str>,
    default_embedding_model: Arc<str>,
}

impl AdapterState {
    pub fn new(adapter: Adapter, default_model: &str, default_embedding_model: &str) -> Self {
        Self {
            adapter,
            default_model: Arc::from(default_model),
            default_embedding_model: Arc::from(default_embedding_model),
        }
    }
}

/// Build the adapter router, to be nested under the route prefix
///
/// Handlers expect a [`RequestContext`] request extension.
pub fn adapter_router(state: AdapterState) -> Router {
    Router::new()
        .route("/chat/completions", routing::post(chat_completions))
        .route("/chat", routing::post(chat))
        .route("/chat/stream", routing::post(chat_stream))
        .route("/models", routing::get(list_models))
        .route("/embeddings", routing::post(embeddings))
        .with_state(state)
}

/// Handle `POST /chat/completions`, streaming when the body asks for it
async fn chat_completions(
    State(state): State<AdapterState>,
    Extension(context): Extension<RequestContext>,
    body: Result<Json<OpenAiRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(&rejection),
    };
    if request.stream.unwrap_or(false) {
        stream_chat(&state, &context, request).await
    } else {
        complete_chat(&state, &context, request).await
    }
}

/// Handle `POST /chat`, never streaming
async fn chat(
    State(state): State<AdapterState>,
    Extension(context): Extension<RequestContext>,
    body: Result<Json<OpenAiRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => complete_chat(&state, &context, request).await,
        Err(rejection) => rejection_response(&rejection),
    }
}

/// Handle `POST /chat/stream`, always streaming
async fn chat_stream(
    State(state): State<AdapterState>,
    Extension(context): Extension<RequestContext>,
    body: Result<Json<OpenAiRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => stream_chat(&state, &context, request).await,
        Err(rejection) => rejection_response(&rejection),
    }
}

async fn complete_chat(state: &AdapterState, context: &RequestContext, request: OpenAiRequest) -> Response {
    let result = async {
        let request = convert::chat_request_to_normalized(request, &state.default_model)?;
        state.adapter.handle_chat(request).await
    }
    .await;

    match result {
        Ok(result) => {
            let id = response_id(context);
            Json(convert::chat_result_to_openai(result, &id, unix_now())).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn stream_chat(state: &AdapterState, context: &RequestContext, request: OpenAiRequest) -> Response {
    let result = async {
        let request = convert::chat_request_to_normalized(request, &state.default_model)?;
        state.adapter.handle_chat_stream(request, context).await
    }
    .await;

    match result {
        Ok(translator) => sse_response(translator, response_id(context)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Render a translator as `OpenAI` SSE chunks followed by `[DONE]`
fn sse_response(translator: StreamTranslator, id: String) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let created = unix_now();
    let model = translator.model_id().to_owned();

    let opening = json_event(&convert::role_chunk(&id, created, &model));
    let events = translator.into_stream().map(move |event| match event {
        StreamEvent::Error(message) => {
            tracing::warn!(model = %model, error = %message, "stream ended with error");
            json_event(&OpenAiErrorResponse {
                error: OpenAiErrorDetail {
                    message,
                    error_type: "upstream_error".to_owned(),
                    code: None,
                },
            })
        }
        other => convert::stream_event_to_chunk(other, &id, created, &model)
            .map_or_else(|| Event::default().comment("skipped"), |chunk| json_event(&chunk)),
    });

    let body = stream::once(async move { opening })
        .chain(events)
        .chain(stream::once(async { Event::default().data("[DONE]") }))
        .map(Ok);

    Sse::new(body).keep_alive(KeepAlive::default())
}

fn json_event<T: serde::Serialize>(payload: &T) -> Event {
    Event::default().data(serde_json::to_string(payload).unwrap_or_default())
}

/// Handle `GET /models`
async fn list_models(State(state): State<AdapterState>) -> Response {
    match state.adapter.list_models().await {
        Ok(entries) => Json(convert::catalog_to_model_list(entries, unix_now())).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handle `POST /embeddings`
async fn embeddings(
    State(state): State<AdapterState>,
    body: Result<Json<OpenAiEmbeddingsRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(&rejection),
    };
    let result = async {
        let request = convert::embeddings_request_to_normalized(request, &state.default_embedding_model)?;
        state.adapter.handle_embeddings(request).await
    }
    .await;

    match result {
        Ok(result) => Json(convert::embeddings_result_to_openai(result)).into_response(),
        Err(e) => error_response(&e),
    }
}

fn response_id(context: &RequestContext) -> String {
    format!("chatcmpl-{}", context.request_id)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    error_response(&AdapterError::InvalidInput(rejection.body_text()))
}

/// Convert an adapter error to an `OpenAI`-style JSON error response
fn error_response(error: &AdapterError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "request failed");
    } else {
        tracing::debug!(error = %error, "request rejected");
    }

    let body = OpenAiErrorResponse {
        error: OpenAiErrorDetail {
            message: error.client_message(),
            error_type: error.error_type().to_owned(),
            code: None,
        },
    };
    (status, Json(body)).into_response()
}
