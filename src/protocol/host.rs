// Host identifiers and the host directory

use crate::api::ApiClient;
use crate::error::{ApiResult, ChmError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

/// Opaque identifier of one managed machine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Result<Self, ChmError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ChmError::InvalidHost(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for HostId {
    type Err = ChmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Body of every host-scoped call: `{"Uuid": "<host>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRequest {
    #[serde(rename = "Uuid")]
    pub uuid: HostId,
}

impl HostRequest {
    pub fn new(uuid: &HostId) -> Self {
        Self { uuid: uuid.clone() }
    }
}

/// One entry of the host directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostSummary {
    /// Whether the host's agent is reachable
    pub status: bool,
    pub hostname: String,
    pub ip: String,
}

/// Lists the hosts known to the backend
#[derive(Clone)]
pub struct HostDirectory {
    api: ApiClient,
}

impl HostDirectory {
    pub const PATH: &'static str = "/chm/pc/all";

    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ApiResult<BTreeMap<HostId, HostSummary>> {
        self.list_with(None).await
    }

    pub async fn list_with(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<BTreeMap<HostId, HostSummary>> {
        let hosts: BTreeMap<HostId, HostSummary> = self.api.get_json(Self::PATH, cancel).await?;
        tracing::debug!("Host directory returned {} host(s)", hosts.len());
        Ok(hosts)
    }
}
