// HTTP transport

use crate::api::{RequestEnvelope, ResponseEnvelope};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::cookie::Jar;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sends one envelope and returns the raw outcome.
///
/// Implementations classify failures but never retry and never emit events;
/// that belongs to the client's middleware.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestEnvelope) -> ApiResult<ResponseEnvelope>;
}

/// reqwest-backed transport with a cookie store, so session cookies are
/// sent on every call
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session_cookie: Option<&str>,
        user_agent: &str,
    ) -> ApiResult<Self> {
        let base = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid base URL {:?}: {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = session_cookie {
            jar.add_cookie_str(cookie, &base);
        }

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_provider(jar)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            timeout,
        })
    }

    fn classify(&self, url: &str, timeout: Duration, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            ApiError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestEnvelope) -> ApiResult<ResponseEnvelope> {
        let url = request.url(&self.base_url)?;
        let url_str = url.to_string();
        let timeout = request.timeout.unwrap_or(self.timeout);

        let mut builder = self.http.request(request.method.clone(), url).timeout(timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.classify(&url_str, timeout, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify(&url_str, timeout, e))?;

        if status.is_success() {
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
                    url: url_str.clone(),
                    message: e.to_string(),
                })?
            };
            return Ok(ResponseEnvelope {
                status: status.as_u16(),
                url: url_str,
                body,
            });
        }

        let body: Option<Value> = serde_json::from_slice(&bytes).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("Message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            });

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
            url: url_str,
            body,
        })
    }
}
