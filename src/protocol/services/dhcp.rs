// ISC DHCP server

use crate::protocol::{
    ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceAction, ServiceLogs,
};
use serde::{Deserialize, Serialize};

pub struct Dhcp;

/// Lease event (DISCOVER, OFFER, REQUEST, ACK, RELEASE, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeaseLogEntry {
    pub date: LogDate,
    pub event: String,
    pub ip: String,
    pub mac: String,
    pub hostname: String,
    pub interface: String,
}

impl LogEntry for LeaseLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "{} {} to {} ({}) via {}",
            self.event, self.ip, self.mac, self.hostname, self.interface
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "LeaseLog")]
    pub lease_log: Vec<LeaseLogEntry>,
    #[serde(rename = "LeaseLength")]
    pub lease_total: u64,
}

impl ServiceLogs for DhcpLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("lease", &self.lease_log, self.lease_total),
        ]
    }
}

impl ManagedService for Dhcp {
    const NAME: &'static str = "dhcp";
    const DISPLAY: &'static str = "DHCP";
    type Logs = DhcpLogs;

    fn actions() -> &'static [ServiceAction] {
        &ServiceAction::EXTENDED
    }
}
