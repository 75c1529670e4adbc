// Generic status/action protocol shared by every managed service

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::protocol::{ActionResult, HostId, HostRequest, LogDigest, ServiceAction, ServiceLogs};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

/// Running state reported by the backend, rendered verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Active,
    Stopped,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Active => "active",
            RunState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Status record returned by `POST /server/<svc>`.
///
/// Every field is required; a reply missing any of them is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusRecord<L> {
    pub hostname: String,
    pub status: RunState,
    /// CPU usage in percent
    pub cpu: f64,
    /// Memory usage in percent
    pub memory: f64,
    pub connections: u64,
    pub logs: L,
}

impl<L: ServiceLogs> StatusRecord<L> {
    pub fn summarize(&self, service: &'static str) -> StatusSummary {
        StatusSummary {
            service,
            hostname: self.hostname.clone(),
            status: self.status,
            cpu: self.cpu,
            memory: self.memory,
            connections: self.connections,
            logs: self.logs.collections().iter().map(|c| c.digest()).collect(),
        }
    }
}

/// Service-independent view of a status record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub service: &'static str,
    pub hostname: String,
    pub status: RunState,
    pub cpu: f64,
    pub memory: f64,
    pub connections: u64,
    pub logs: Vec<LogDigest>,
}

/// Static description of one managed service
pub trait ManagedService: Send + Sync + 'static {
    /// Path segment in `/server/<svc>`
    const NAME: &'static str;
    const DISPLAY: &'static str;

    type Logs: ServiceLogs + DeserializeOwned + Serialize + fmt::Debug + Clone + Send + Sync;

    fn actions() -> &'static [ServiceAction] {
        &ServiceAction::BASIC
    }

    fn supports(action: ServiceAction) -> bool {
        Self::actions().contains(&action)
    }
}

/// Typed client for one managed service
pub struct ServiceClient<S: ManagedService> {
    api: ApiClient,
    _service: PhantomData<fn() -> S>,
}

impl<S: ManagedService> Clone for ServiceClient<S> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<S: ManagedService> ServiceClient<S> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _service: PhantomData,
        }
    }

    pub fn status_path() -> String {
        format!("/server/{}", S::NAME)
    }

    pub fn action_path(action: ServiceAction) -> String {
        format!("/server/{}/action/{}", S::NAME, action)
    }

    /// Last-known status of the service on `host`
    pub async fn get_status(&self, host: &HostId) -> ApiResult<StatusRecord<S::Logs>> {
        self.fetch_status(host, None).await
    }

    pub async fn get_status_with(
        &self,
        host: &HostId,
        cancel: &CancellationToken,
    ) -> ApiResult<StatusRecord<S::Logs>> {
        self.fetch_status(host, Some(cancel)).await
    }

    /// Ask the backend to apply `action` on `host`.
    ///
    /// Actions the service does not support are rejected without a call.
    pub async fn perform_action(&self, host: &HostId, action: ServiceAction) -> ApiResult<ActionResult> {
        self.send_action(host, action, None).await
    }

    pub async fn perform_action_with(
        &self,
        host: &HostId,
        action: ServiceAction,
        cancel: &CancellationToken,
    ) -> ApiResult<ActionResult> {
        self.send_action(host, action, Some(cancel)).await
    }

    async fn fetch_status(
        &self,
        host: &HostId,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<StatusRecord<S::Logs>> {
        let record: StatusRecord<S::Logs> = self
            .api
            .post_json(&Self::status_path(), &HostRequest::new(host), cancel)
            .await?;
        tracing::debug!("{} on {}: {}", S::DISPLAY, host, record.status);
        Ok(record)
    }

    async fn send_action(
        &self,
        host: &HostId,
        action: ServiceAction,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ActionResult> {
        if !S::supports(action) {
            return Err(ApiError::UnsupportedAction {
                service: S::DISPLAY,
                action,
            });
        }

        tracing::info!("Requesting {} {} on {}", S::DISPLAY, action, host);
        let result: ActionResult = self
            .api
            .post_json(&Self::action_path(action), &HostRequest::new(host), cancel)
            .await?;

        if result.is_accepted() {
            tracing::info!("{} {} accepted on {}: {}", S::DISPLAY, action, host, result.message);
        } else {
            tracing::warn!("{} {} refused on {}: {}", S::DISPLAY, action, host, result.message);
        }
        Ok(result)
    }
}

/// Object-safe view of a [`ServiceClient`], for consumers that pick the
/// service at runtime
#[async_trait]
pub trait ServiceProtocol: Send + Sync {
    fn name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn actions(&self) -> &'static [ServiceAction];

    async fn status(&self, host: &HostId, cancel: Option<&CancellationToken>) -> ApiResult<StatusSummary>;

    /// Raw status record as JSON, exactly as decoded
    async fn status_json(
        &self,
        host: &HostId,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<serde_json::Value>;

    async fn action(
        &self,
        host: &HostId,
        action: ServiceAction,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ActionResult>;
}

#[async_trait]
impl<S: ManagedService> ServiceProtocol for ServiceClient<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn display_name(&self) -> &'static str {
        S::DISPLAY
    }

    fn actions(&self) -> &'static [ServiceAction] {
        S::actions()
    }

    async fn status(&self, host: &HostId, cancel: Option<&CancellationToken>) -> ApiResult<StatusSummary> {
        let record = self.fetch_status(host, cancel).await?;
        Ok(record.summarize(S::NAME))
    }

    async fn status_json(
        &self,
        host: &HostId,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<serde_json::Value> {
        let record = self.fetch_status(host, cancel).await?;
        serde_json::to_value(&record).map_err(|e| ApiError::Decode {
            url: Self::status_path(),
            message: e.to_string(),
        })
    }

    async fn action(
        &self,
        host: &HostId,
        action: ServiceAction,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ActionResult> {
        self.send_action(host, action, cancel).await
    }
}
