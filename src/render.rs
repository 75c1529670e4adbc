// Plain-text rendering for the command line

use crate::monitor::ServiceState;
use crate::protocol::{ActionResult, HostId, HostSummary, ResultKind, RunState, ServiceAction, ServiceKind, StatusSummary};
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn state_icon(state: RunState) -> &'static str {
    match state {
        RunState::Active => "●",
        RunState::Stopped => "○",
    }
}

/// Status block; `Status` is printed exactly as the backend sent it
pub fn status(summary: &StatusSummary, log_lines: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} on {}", state_icon(summary.status), summary.service, summary.hostname);
    let _ = writeln!(out, "  Status:      {}", summary.status);
    let _ = writeln!(out, "  CPU:         {:.1}%", summary.cpu);
    let _ = writeln!(out, "  Memory:      {:.1}%", summary.memory);
    let _ = writeln!(out, "  Connections: {}", summary.connections);

    for log in &summary.logs {
        if log.is_truncated() {
            let _ = writeln!(out, "  {} log: showing {} of {}", log.name, log.returned(), log.total);
        } else {
            let _ = writeln!(out, "  {} log: {} entries", log.name, log.total);
        }
        for line in log.lines.iter().take(log_lines) {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn action_result(service: &str, action: ServiceAction, host: &HostId, result: &ActionResult) -> String {
    match result.kind {
        ResultKind::Ok => format!("✓ {} {} accepted on {}: {}", service, action, host, result.message),
        ResultKind::Err => format!("✗ {} {} refused on {}: {}", service, action, host, result.message),
    }
}

pub fn hosts(hosts: &BTreeMap<HostId, HostSummary>) -> String {
    if hosts.is_empty() {
        return "No hosts registered\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<38} {:<24} {:<16} STATUS", "HOST", "HOSTNAME", "IP");
    for (id, host) in hosts {
        let status = if host.status { "online" } else { "offline" };
        let _ = writeln!(out, "{:<38} {:<24} {:<16} {}", id, host.hostname, host.ip, status);
    }
    out
}

pub fn services() -> String {
    let mut out = String::new();
    for kind in ServiceKind::ALL {
        let actions: Vec<&str> = kind.actions().iter().map(|a| a.as_str()).collect();
        let _ = writeln!(out, "{:<8} {}", kind.name(), actions.join(", "));
    }
    out
}

/// One line for the watch loop
pub fn monitor_line(state: &ServiceState, summary: Option<&StatusSummary>) -> String {
    let now = chrono::Local::now().format("%H:%M:%S");
    match (state, summary) {
        (ServiceState::Error(message), _) => format!("[{}] error: {}", now, message),
        (_, Some(s)) => format!(
            "[{}] {} cpu {:.1}% mem {:.1}% conn {}",
            now, s.status, s.cpu, s.memory, s.connections
        ),
        (state, None) => format!("[{}] {}", now, state.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LogDigest;

    fn summary() -> StatusSummary {
        StatusSummary {
            service: "nginx",
            hostname: "web-01".to_string(),
            status: RunState::Stopped,
            cpu: 0.0,
            memory: 12.25,
            connections: 0,
            logs: vec![LogDigest {
                name: "error",
                total: 40,
                lines: vec!["first".to_string(), "second".to_string(), "third".to_string()],
            }],
        }
    }

    #[test]
    fn test_status_renders_state_verbatim() {
        let text = status(&summary(), 2);
        assert!(text.contains("Status:      stopped"));
        assert!(text.contains("error log: showing 3 of 40"));
        assert!(text.contains("    first"));
        assert!(text.contains("    second"));
        assert!(!text.contains("third"));
    }

    #[test]
    fn test_action_result_keeps_message() {
        let host = HostId::new("host-1").unwrap();
        let result = ActionResult {
            kind: ResultKind::Err,
            message: "service busy".to_string(),
        };
        let text = action_result("apache", ServiceAction::Restart, &host, &result);
        assert!(text.ends_with(": service busy"));
        assert!(text.starts_with("✗"));
    }

    #[test]
    fn test_services_lists_every_kind() {
        let text = services();
        assert_eq!(text.lines().count(), 10);
        assert!(text.contains("ssh      start, stop, restart, enable"));
    }

    #[test]
    fn test_monitor_line_for_error() {
        let line = monitor_line(&ServiceState::Error("timed out".to_string()), None);
        assert!(line.ends_with("error: timed out"));
    }
}
