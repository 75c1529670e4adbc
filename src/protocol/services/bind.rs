// BIND DNS server

use crate::protocol::{ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceLogs};
use serde::{Deserialize, Serialize};

pub struct Bind;

/// One resolved DNS query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryLogEntry {
    pub date: LogDate,
    pub client: String,
    pub name: String,
    pub class: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub flags: String,
}

impl LogEntry for QueryLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "client {} query: {} {} {} {}",
            self.client, self.name, self.class, self.record_type, self.flags
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "QueryLog")]
    pub query_log: Vec<QueryLogEntry>,
    #[serde(rename = "QueryLength")]
    pub query_total: u64,
}

impl ServiceLogs for BindLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("query", &self.query_log, self.query_total),
        ]
    }
}

impl ManagedService for Bind {
    const NAME: &'static str = "bind";
    const DISPLAY: &'static str = "BIND";
    type Logs = BindLogs;
}
