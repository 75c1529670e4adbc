// Service actions and their results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verb sent to a managed service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    StartEnable,
    StopDisable,
}

impl ServiceAction {
    /// Actions every managed service accepts
    pub const BASIC: [ServiceAction; 3] = [
        ServiceAction::Start,
        ServiceAction::Stop,
        ServiceAction::Restart,
    ];

    /// Basic actions plus boot-time enable/disable
    pub const EXTENDED: [ServiceAction; 7] = [
        ServiceAction::Start,
        ServiceAction::Stop,
        ServiceAction::Restart,
        ServiceAction::Enable,
        ServiceAction::Disable,
        ServiceAction::StartEnable,
        ServiceAction::StopDisable,
    ];

    /// Path segment used in `/server/<svc>/action/<action>`
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
            ServiceAction::StartEnable => "start_enable",
            ServiceAction::StopDisable => "stop_disable",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceAction::EXTENDED
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    Ok,
    Err,
}

/// Backend reply to an action.
///
/// `Ok` means the backend accepted the action, not that the service has
/// changed state; re-fetch the status to confirm. `Err` is a normal reply
/// carrying the reason the action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(rename = "Type")]
    pub kind: ResultKind,
    #[serde(rename = "Message")]
    pub message: String,
}

impl ActionResult {
    pub fn is_accepted(&self) -> bool {
        self.kind == ResultKind::Ok
    }
}
