// ProFTPD file server

use crate::protocol::{ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceLogs};
use serde::{Deserialize, Serialize};

pub struct Proftpd;

/// xferlog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferLogEntry {
    pub date: LogDate,
    pub client: String,
    pub user: String,
    pub file: String,
    /// "i" for upload, "o" for download
    pub direction: String,
    pub bytes: u64,
    pub status: String,
}

impl LogEntry for TransferLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        let arrow = if self.direction == "i" { "<-" } else { "->" };
        format!(
            "{} {} {} {} ({} bytes, {})",
            self.user, self.client, arrow, self.file, self.bytes, self.status
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProftpdLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "TransferLog")]
    pub transfer_log: Vec<TransferLogEntry>,
    #[serde(rename = "TransferLength")]
    pub transfer_total: u64,
}

impl ServiceLogs for ProftpdLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("transfer", &self.transfer_log, self.transfer_total),
        ]
    }
}

impl ManagedService for Proftpd {
    const NAME: &'static str = "proftpd";
    const DISPLAY: &'static str = "ProFTPD";
    type Logs = ProftpdLogs;
}
