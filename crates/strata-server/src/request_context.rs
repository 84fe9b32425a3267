use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use strata_core::RequestContext;
use tokio_util::sync::CancellationToken;

/// Middleware that attaches a fresh `RequestContext` to each request
///
/// The context's cancellation token is a child of the server shutdown
/// token, so shutting down stops every open stream.
pub async fn request_context_middleware(shutdown: CancellationToken, mut request: Request, next: Next) -> Response {
    let context = RequestContext::new(shutdown.child_token());
    tracing::debug!(request_id = %context.request_id, path = %request.uri().path(), "request received");
    request.extensions_mut().insert(context);
    next.run(request).await
}
