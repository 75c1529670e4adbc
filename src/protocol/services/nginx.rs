// Nginx

use crate::protocol::{AccessLogEntry, ErrorLogEntry, LogCollection, ManagedService, ServiceLogs};
use serde::{Deserialize, Serialize};

pub struct Nginx;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NginxLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "AccessLog")]
    pub access_log: Vec<AccessLogEntry>,
    #[serde(rename = "AccLength")]
    pub access_total: u64,
}

impl ServiceLogs for NginxLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("access", &self.access_log, self.access_total),
        ]
    }
}

impl ManagedService for Nginx {
    const NAME: &'static str = "nginx";
    const DISPLAY: &'static str = "Nginx";
    type Logs = NginxLogs;
}
