// Log collections shared by the managed services

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp as sent by the backend: a nested object of calendar fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl LogDate {
    /// None when the fields do not form a valid calendar time
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One structured log line
pub trait LogEntry {
    fn date(&self) -> &LogDate;

    /// Event-specific fields rendered on one line, without the timestamp
    fn detail(&self) -> String;

    fn line(&self) -> String {
        format!("{} {}", self.date(), self.detail())
    }
}

/// Error-log entry; every service uses this shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorLogEntry {
    pub date: LogDate,
    pub module: String,
    pub level: String,
    pub pid: u32,
    pub client: String,
    pub message: String,
}

impl LogEntry for ErrorLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        if self.client.is_empty() {
            format!("[{}:{}] [pid {}] {}", self.module, self.level, self.pid, self.message)
        } else {
            format!(
                "[{}:{}] [pid {}] [client {}] {}",
                self.module, self.level, self.pid, self.client, self.message
            )
        }
    }
}

/// HTTP access-log entry (Apache, Nginx)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessLogEntry {
    pub date: LogDate,
    pub ip: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub code: u16,
    pub size: u64,
    pub referer: String,
    pub agent: String,
}

impl LogEntry for AccessLogEntry {
    fn date(&self) -> &LogDate {
        &self.date
    }

    fn detail(&self) -> String {
        format!(
            "{} \"{} {} {}\" {} {}",
            self.ip, self.method, self.path, self.protocol, self.code, self.size
        )
    }
}

/// One log collection borrowed from a status record.
///
/// `total` is the backend's count and may exceed `entries.len()`.
pub struct LogCollection<'a> {
    pub name: &'static str,
    pub total: u64,
    pub entries: Vec<&'a dyn LogEntry>,
}

impl<'a> LogCollection<'a> {
    pub fn new<E: LogEntry>(name: &'static str, entries: &'a [E], total: u64) -> Self {
        Self {
            name,
            total,
            entries: entries.iter().map(|e| e as &dyn LogEntry).collect(),
        }
    }

    pub fn digest(&self) -> LogDigest {
        LogDigest {
            name: self.name,
            total: self.total,
            lines: self.entries.iter().map(|e| e.line()).collect(),
        }
    }
}

/// Owned, rendered copy of a log collection in backend order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogDigest {
    pub name: &'static str,
    pub total: u64,
    pub lines: Vec<String>,
}

impl LogDigest {
    pub fn returned(&self) -> usize {
        self.lines.len()
    }

    /// True when the backend holds more entries than it sent
    pub fn is_truncated(&self) -> bool {
        (self.lines.len() as u64) < self.total
    }
}

/// The log block of one service's status record
pub trait ServiceLogs {
    fn collections(&self) -> Vec<LogCollection<'_>>;
}
