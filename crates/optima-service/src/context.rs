//! Per-request context propagated to outbound calls.

use std::future::Future;
use uuid::Uuid;

/// Header carrying the correlation id on outbound calls.
pub const CORRELATION_ID_HEADER: &str = "tmx-correlation-id";

tokio::task_local! {
    static USER_CONTEXT: UserContext;
}

/// Correlation id and caller credential for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    /// Correlation id shared by every log line and outbound call of a request.
    pub correlation_id: String,
    /// Bearer token forwarded to downstream services.
    pub auth_token: Option<String>,
}

impl UserContext {
    /// Creates a context with the given correlation id.
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            auth_token: None,
        }
    }

    /// Creates a context with a freshly generated correlation id.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Returns the context of the current task, if one is in scope.
    pub fn current() -> Option<Self> {
        USER_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Returns the current correlation id, if any.
    pub fn current_correlation_id() -> Option<String> {
        USER_CONTEXT.try_with(|ctx| ctx.correlation_id.clone()).ok()
    }

    /// Runs `f` with this context in scope.
    pub async fn scope<F: Future>(self, f: F) -> F::Output {
        USER_CONTEXT.scope(self, f).await
    }
}
