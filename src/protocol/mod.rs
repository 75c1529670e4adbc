// Service status/action protocol

pub mod action;
pub mod host;
pub mod logs;
pub mod service;
pub mod services;


pub use action::{ActionResult, ResultKind, ServiceAction};
pub use host::{HostDirectory, HostId, HostRequest, HostSummary};
pub use logs::{AccessLogEntry, ErrorLogEntry, LogCollection, LogDate, LogDigest, LogEntry, ServiceLogs};
pub use service::{
    ManagedService, RunState, ServiceClient, ServiceProtocol, StatusRecord, StatusSummary,
};
pub use services::ServiceKind;
