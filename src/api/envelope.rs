// Request and response envelopes

use crate::error::{ApiError, ApiResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// One call to the backend, built per request and never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub method: Method,
    /// Path below the API base URL, starting with '/'
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the client's default timeout for this call
    pub timeout: Option<Duration>,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Join the path onto `base_url`, keeping any path prefix the base carries
    pub fn url(&self, base_url: &str) -> ApiResult<reqwest::Url> {
        if !self.path.starts_with('/') {
            return Err(ApiError::InvalidRequest(format!(
                "Path must start with '/': {:?}",
                self.path
            )));
        }
        let joined = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        reqwest::Url::parse(&joined)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid URL {:?}: {}", joined, e)))
    }
}

/// A 2xx response with its parsed body
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub url: String,
    /// Parsed JSON body; `Null` when the server sent nothing
    pub body: Value,
}

impl ResponseEnvelope {
    /// Decode the body into `T`. Missing or mistyped fields are a decode error.
    pub fn json<T: DeserializeOwned>(self) -> ApiResult<T> {
        let url = self.url;
        serde_json::from_value(self.body).map_err(|e| ApiError::Decode {
            url,
            message: e.to_string(),
        })
    }
}
