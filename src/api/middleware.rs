// Request/response middleware pipeline

use crate::api::{RequestEnvelope, ResponseEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::events::{EventBus, AUTH_FORBIDDEN, AUTH_UNAUTHORIZED};
use serde_json::json;
use std::sync::Arc;

/// Transforms a request before it is sent
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: RequestEnvelope) -> ApiResult<RequestEnvelope>;
}

/// Observes or transforms the outcome of a call, success or failure
pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, outcome: ApiResult<ResponseEnvelope>) -> ApiResult<ResponseEnvelope>;
}

/// Ordered middleware applied around every transport call
#[derive(Clone, Default)]
pub struct Pipeline {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pipeline every client starts with
    pub fn standard(bus: EventBus) -> Self {
        Self::new()
            .with_request(RequestTrace)
            .with_response(AuthEvents::new(bus))
    }

    pub fn with_request(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request.push(Arc::new(middleware));
        self
    }

    pub fn with_response(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.response.push(Arc::new(middleware));
        self
    }

    pub fn apply_request(&self, request: RequestEnvelope) -> ApiResult<RequestEnvelope> {
        self.request
            .iter()
            .try_fold(request, |request, middleware| middleware.on_request(request))
    }

    pub fn apply_response(&self, outcome: ApiResult<ResponseEnvelope>) -> ApiResult<ResponseEnvelope> {
        self.response
            .iter()
            .fold(outcome, |outcome, middleware| middleware.on_response(outcome))
    }
}

/// Pass-through request hook; logs the call at debug level
pub struct RequestTrace;

impl RequestMiddleware for RequestTrace {
    fn on_request(&self, request: RequestEnvelope) -> ApiResult<RequestEnvelope> {
        tracing::debug!("{} {}", request.method, request.path);
        Ok(request)
    }
}

/// Publishes auth failures on the event bus and passes the error on unchanged
pub struct AuthEvents {
    bus: EventBus,
}

impl AuthEvents {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl ResponseMiddleware for AuthEvents {
    fn on_response(&self, outcome: ApiResult<ResponseEnvelope>) -> ApiResult<ResponseEnvelope> {
        if let Err(ApiError::Http { status, url, .. }) = &outcome {
            let event = match status {
                401 => Some(AUTH_UNAUTHORIZED),
                403 => Some(AUTH_FORBIDDEN),
                _ => None,
            };
            if let Some(event) = event {
                tracing::warn!("{} returned {}, emitting '{}'", url, status, event);
                self.bus.emit(event, json!({ "status": status }));
            }
        }
        outcome
    }
}
