use tokio_util::sync::CancellationToken;

/// Per-request context handed from the HTTP layer to the adapter
///
/// The cancellation token is a child of the process shutdown token, so
/// open streams stop when either the request or the server goes away.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier used for response ids and log correlation
    pub request_id: String,
    /// Cancelled when the caller is no longer interested in the result
    pub cancellation: CancellationToken,
}

impl RequestContext {
    /// Create a context with a fresh id and the given cancellation token
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().simple().to_string(),
            cancellation,
        }
    }

    /// Create a context that is never cancelled, for embedded (non-HTTP) use
    pub fn detached() -> Self {
        Self::new(CancellationToken::new())
    }

    /// Whether the caller has gone away
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
