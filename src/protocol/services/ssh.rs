// OpenSSH server

use crate::protocol::{
    ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceAction, ServiceLogs,
};
use serde::{Deserialize, Serialize};

pub struct Ssh;

/// Authentication attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthLogEntry {
    pub date: LogDate,
    pub user: String,
    pub ip: String,
    pub port: u16,
    /// "password", "publickey", ...
    pub method: String,
    pub accepted: bool,
}

impl LogEntry for AuthLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        let outcome = if self.accepted { "Accepted" } else { "Failed" };
        format!(
            "{} {} for {} from {} port {}",
            outcome, self.method, self.user, self.ip, self.port
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "AuthLog")]
    pub auth_log: Vec<AuthLogEntry>,
    #[serde(rename = "AuthLength")]
    pub auth_total: u64,
}

impl ServiceLogs for SshLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("auth", &self.auth_log, self.auth_total),
        ]
    }
}

impl ManagedService for Ssh {
    const NAME: &'static str = "ssh";
    const DISPLAY: &'static str = "SSH";
    type Logs = SshLogs;

    fn actions() -> &'static [ServiceAction] {
        &ServiceAction::EXTENDED
    }
}
