// Squid caching proxy

use crate::protocol::{ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceLogs};
use serde::{Deserialize, Serialize};

pub struct Squid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProxyAccessEntry {
    pub date: LogDate,
    /// Response time in milliseconds
    pub elapsed: u64,
    pub client: String,
    /// Cache result and status, e.g. "TCP_MISS/200"
    pub result: String,
    pub bytes: u64,
    pub method: String,
    pub url: String,
}

impl LogEntry for ProxyAccessEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "{}ms {} {} {} {} {}",
            self.elapsed, self.client, self.result, self.bytes, self.method, self.url
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquidLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "AccessLog")]
    pub access_log: Vec<ProxyAccessEntry>,
    #[serde(rename = "AccLength")]
    pub access_total: u64,
}

impl ServiceLogs for SquidLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("access", &self.access_log, self.access_total),
        ]
    }
}

impl ManagedService for Squid {
    const NAME: &'static str = "squid";
    const DISPLAY: &'static str = "Squid";
    type Logs = SquidLogs;
}
