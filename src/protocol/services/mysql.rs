// MySQL database server

use crate::protocol::{
    ErrorLogEntry, LogCollection, LogDate, LogEntry, ManagedService, ServiceAction, ServiceLogs,
};
use serde::{Deserialize, Serialize};

pub struct Mysql;

/// Slow/general query log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlQueryEntry {
    pub date: LogDate,
    pub user: String,
    pub database: String,
    /// Execution time in seconds
    pub duration: f64,
    pub query: String,
}

impl LogEntry for SqlQueryEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "{}@{} ({:.3}s) {}",
            self.user, self.database, self.duration, self.query
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlLogs {
    #[serde(rename = "ErrorLog")]
    pub error_log: Vec<ErrorLogEntry>,
    #[serde(rename = "ErrLength")]
    pub error_total: u64,
    #[serde(rename = "QueryLog")]
    pub query_log: Vec<SqlQueryEntry>,
    #[serde(rename = "QueryLength")]
    pub query_total: u64,
}

impl ServiceLogs for MysqlLogs {
    fn collections(&self) -> Vec<LogCollection<'_>> {
        vec![
            LogCollection::new("error", &self.error_log, self.error_total),
            LogCollection::new("query", &self.query_log, self.query_total),
        ]
    }
}

impl ManagedService for Mysql {
    const NAME: &'static str = "mysql";
    const DISPLAY: &'static str = "MySQL";
    type Logs = MysqlLogs;

    fn actions() -> &'static [ServiceAction] {
        &ServiceAction::EXTENDED
    }
}
