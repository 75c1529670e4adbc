// Samba file and print server

use crate::protocol::{
    ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceAction, ServiceLogs,
};
use serde::{Deserialize, Serialize};

pub struct Samba;

/// full_audit VFS entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShareAuditEntry {
    pub date: LogDate,
    pub user: String,
    pub client: String,
    pub share: String,
    pub operation: String,
    pub path: String,
    pub result: String,
}

impl LogEntry for ShareAuditEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.user, self.client, self.share, self.operation, self.result, self.path
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SambaLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "AuditLog")]
    pub audit_log: Vec<ShareAuditEntry>,
    #[serde(rename = "AuditLength")]
    pub audit_total: u64,
}

impl ServiceLogs for SambaLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("audit", &self.audit_log, self.audit_total),
        ]
    }
}

impl ManagedService for Samba {
    const NAME: &'static str = "samba";
    const DISPLAY: &'static str = "Samba";
    type Logs = SambaLogs;

    fn actions() -> &'static [ServiceAction] {
        &ServiceAction::EXTENDED
    }
}
