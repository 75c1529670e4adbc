// OpenLDAP directory server

use crate::protocol::{ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceLogs};
use serde::{Deserialize, Serialize};

pub struct Ldap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LdapAuditEntry {
    pub date: LogDate,
    pub connection: u64,
    pub operation: String,
    pub dn: String,
    pub result: i32,
}

impl LogEntry for LdapAuditEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "conn={} {} dn=\"{}\" err={}",
            self.connection, self.operation, self.dn, self.result
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdapLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "AuditLog")]
    pub audit_log: Vec<LdapAuditEntry>,
    #[serde(rename = "AuditLength")]
    pub audit_total: u64,
}

impl ServiceLogs for LdapLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("audit", &self.audit_log, self.audit_total),
        ]
    }
}

impl ManagedService for Ldap {
    const NAME: &'static str = "ldap";
    const DISPLAY: &'static str = "LDAP";
    type Logs = LdapLogs;
}
