// Configured API client

use crate::api::{HttpTransport, Pipeline, RequestEnvelope, ResponseEnvelope, Transport};
use crate::error::{ApiError, ApiResult};
use crate::events::EventBus;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API base URL when neither config nor environment provide one
pub const DEFAULT_BASE_URL: &str = "http://localhost/api";

/// Settings fixed when the client is built
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Cookie seeded into the store, e.g. `session=abc123`
    pub session_cookie: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_cookie: None,
            user_agent: format!("chmctl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
    timeout: Duration,
    /// Used to report full URLs in client-side errors
    base_url: Option<String>,
}

/// Single entry point for calls to the management API.
///
/// Holds no per-call state; clones share the same transport and pipeline.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Build an HTTP client with the standard pipeline wired to `bus`
    pub fn new(config: &ClientConfig, bus: EventBus) -> ApiResult<Self> {
        let transport = HttpTransport::new(
            &config.base_url,
            config.timeout,
            config.session_cookie.as_deref(),
            &config.user_agent,
        )?;

        tracing::info!(
            "API client ready: base={} timeout={:?}",
            config.base_url,
            config.timeout
        );

        Ok(Self::with_transport(
            Arc::new(transport),
            Pipeline::standard(bus),
            config.timeout,
        )
        .with_base_url(&config.base_url))
    }

    /// Assemble a client from parts
    pub fn with_transport(transport: Arc<dyn Transport>, pipeline: Pipeline, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                pipeline,
                timeout,
                base_url: None,
            }),
        }
    }

    /// Base URL joined with request paths when the client reports an error
    /// itself (timeouts); the transport reports its own URLs
    pub fn with_base_url(self, base_url: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport: self.inner.transport.clone(),
                pipeline: self.inner.pipeline.clone(),
                timeout: self.inner.timeout,
                base_url: Some(base_url.to_string()),
            }),
        }
    }

    fn display_url(&self, envelope: &RequestEnvelope) -> String {
        self.inner
            .base_url
            .as_deref()
            .and_then(|base| envelope.url(base).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| envelope.path.clone())
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub async fn request(&self, envelope: RequestEnvelope) -> ApiResult<ResponseEnvelope> {
        self.request_with(envelope, None).await
    }

    /// Run one call through the pipeline.
    ///
    /// Request middleware errors skip the transport but still pass through the
    /// response middleware. `cancel` aborts the in-flight call.
    pub async fn request_with(
        &self,
        envelope: RequestEnvelope,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ResponseEnvelope> {
        let outcome = match self.inner.pipeline.apply_request(envelope) {
            Ok(envelope) => self.dispatch(envelope, cancel).await,
            Err(error) => Err(error),
        };

        if let Err(error) = &outcome {
            tracing::debug!("Request failed: {}", error);
        }

        self.inner.pipeline.apply_response(outcome)
    }

    async fn dispatch(
        &self,
        envelope: RequestEnvelope,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ResponseEnvelope> {
        let timeout = envelope.timeout.unwrap_or(self.inner.timeout);
        let url = self.display_url(&envelope);

        let call = async {
            tokio::time::timeout(timeout, self.inner.transport.send(envelope))
                .await
                .map_err(|_| ApiError::Timeout { url, timeout })?
        };

        match cancel {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(ApiError::Cancelled);
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                    outcome = call => outcome,
                }
            }
            None => call.await,
        }
    }

    /// GET `path` and decode the body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T> {
        self.request_with(RequestEnvelope::get(path), cancel)
            .await?
            .json()
    }

    /// POST `body` as JSON to `path` and decode the response body
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = RequestEnvelope::post(path).json(body)?;
        self.request_with(envelope, cancel).await?.json()
    }
}
