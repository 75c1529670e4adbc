// Client-side service state tracking and polling

use crate::error::{ApiError, ApiResult};
use crate::protocol::{ActionResult, HostId, RunState, ServiceAction, ServiceProtocol, StatusSummary};
use crate::resilience::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// State of one service on one host as observed by the client
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceState {
    /// No status fetched yet
    Unknown,
    Active,
    Stopped,
    /// Last fetch failed; only another fetch can leave this state
    Error(String),
}

impl From<RunState> for ServiceState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Active => ServiceState::Active,
            RunState::Stopped => ServiceState::Stopped,
        }
    }
}

impl ServiceState {
    pub fn label(&self) -> &str {
        match self {
            ServiceState::Unknown => "unknown",
            ServiceState::Active => "active",
            ServiceState::Stopped => "stopped",
            ServiceState::Error(_) => "error",
        }
    }
}

/// Update produced by [`ServiceMonitor::watch`]
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Refreshed(StatusSummary),
    Failed(String),
}

/// Tracks the state machine of one service on one host.
///
/// Only a successful status fetch moves the state. Actions are recorded as
/// pending until the next fetch confirms or contradicts them.
pub struct ServiceMonitor {
    protocol: Arc<dyn ServiceProtocol>,
    host: HostId,
    retry: RetryPolicy,
    state: ServiceState,
    last: Option<StatusSummary>,
    pending: Option<ServiceAction>,
}

impl ServiceMonitor {
    pub fn new(protocol: Arc<dyn ServiceProtocol>, host: HostId) -> Self {
        Self {
            protocol,
            host,
            retry: RetryPolicy::none(),
            state: ServiceState::Unknown,
            last: None,
            pending: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// Last successful status, kept across failed fetches
    pub fn last_status(&self) -> Option<&StatusSummary> {
        self.last.as_ref()
    }

    /// Action accepted by the backend but not yet confirmed by a fetch
    pub fn pending_action(&self) -> Option<ServiceAction> {
        self.pending
    }

    pub fn host(&self) -> &HostId {
        &self.host
    }

    /// Fetch the status and advance the state machine.
    ///
    /// A cancelled fetch leaves the state untouched.
    pub async fn refresh(&mut self, cancel: Option<&CancellationToken>) -> ApiResult<&StatusSummary> {
        let protocol = self.protocol.clone();
        let host = self.host.clone();
        let outcome = self
            .retry
            .run("get_status", || {
                let protocol = protocol.clone();
                let host = host.clone();
                async move { protocol.status(&host, cancel).await }
            })
            .await;

        match outcome {
            Ok(summary) => {
                let next = ServiceState::from(summary.status);
                if next != self.state {
                    tracing::info!(
                        "{} on {}: {} -> {}",
                        self.protocol.display_name(),
                        self.host,
                        self.state.label(),
                        next.label()
                    );
                }
                self.state = next;
                self.pending = None;
                Ok(&*self.last.insert(summary))
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(error) => {
                tracing::warn!(
                    "{} status on {} failed: {}",
                    self.protocol.display_name(),
                    self.host,
                    error
                );
                self.state = ServiceState::Error(error.to_string());
                Err(error)
            }
        }
    }

    /// Send an action. The state does not change until the next refresh.
    pub async fn perform(
        &mut self,
        action: ServiceAction,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<ActionResult> {
        let result = self.protocol.action(&self.host, action, cancel).await?;
        if result.is_accepted() {
            self.pending = Some(action);
        }
        Ok(result)
    }

    /// Poll every `interval` until `cancel` fires or the stream is dropped
    pub fn watch(mut self, interval: Duration, cancel: CancellationToken) -> ReceiverStream<MonitorEvent> {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A slow fetch must not be followed by a burst of catch-up polls
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let event = match self.refresh(Some(&cancel)).await {
                    Ok(summary) => MonitorEvent::Refreshed(summary.clone()),
                    Err(ApiError::Cancelled) => break,
                    Err(error) => MonitorEvent::Failed(error.to_string()),
                };

                if tx.send(event).await.is_err() {
                    break;
                }
            }
            tracing::debug!("Monitor for {} stopped", self.host);
        });

        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ResultKind, ServiceAction};
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;

    /// Scripted protocol: pops one status outcome per call
    struct Scripted {
        statuses: Mutex<Vec<ApiResult<RunState>>>,
        action_reply: ActionResult,
    }

    impl Scripted {
        fn new(statuses: Vec<ApiResult<RunState>>, kind: ResultKind) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.into_iter().rev().collect()),
                action_reply: ActionResult {
                    kind,
                    message: "done".to_string(),
                },
            })
        }
    }

    #[async_trait]
    impl ServiceProtocol for Scripted {
        fn name(&self) -> &'static str {
            "apache"
        }

        fn display_name(&self) -> &'static str {
            "Apache"
        }

        fn actions(&self) -> &'static [ServiceAction] {
            &ServiceAction::BASIC
        }

        async fn status(&self, _host: &HostId, _cancel: Option<&CancellationToken>) -> ApiResult<StatusSummary> {
            let next = self
                .statuses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ApiError::Cancelled))?;
            Ok(StatusSummary {
                service: "apache",
                hostname: "srv1".to_string(),
                status: next,
                cpu: 1.0,
                memory: 2.0,
                connections: 0,
                logs: Vec::new(),
            })
        }

        async fn status_json(
            &self,
            _host: &HostId,
            _cancel: Option<&CancellationToken>,
        ) -> ApiResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        async fn action(
            &self,
            _host: &HostId,
            _action: ServiceAction,
            _cancel: Option<&CancellationToken>,
        ) -> ApiResult<ActionResult> {
            Ok(self.action_reply.clone())
        }
    }

    fn host() -> HostId {
        HostId::new("host-1").unwrap()
    }

    fn refused() -> ApiError {
        ApiError::Transport {
            url: "/server/apache".to_string(),
            message: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_initial_state_is_unknown() {
        let monitor = ServiceMonitor::new(Scripted::new(vec![], ResultKind::Ok), host());
        assert_eq!(*monitor.state(), ServiceState::Unknown);
        assert!(monitor.last_status().is_none());
    }

    #[tokio::test]
    async fn test_accepted_action_does_not_flip_state() {
        let protocol = Scripted::new(vec![Ok(RunState::Active), Ok(RunState::Stopped)], ResultKind::Ok);
        let mut monitor = ServiceMonitor::new(protocol, host());

        monitor.refresh(None).await.unwrap();
        assert_eq!(*monitor.state(), ServiceState::Active);

        let result = monitor.perform(ServiceAction::Stop, None).await.unwrap();
        assert!(result.is_accepted());
        assert_eq!(*monitor.state(), ServiceState::Active);
        assert_eq!(monitor.pending_action(), Some(ServiceAction::Stop));

        monitor.refresh(None).await.unwrap();
        assert_eq!(*monitor.state(), ServiceState::Stopped);
        assert_eq!(monitor.pending_action(), None);
    }

    #[tokio::test]
    async fn test_refused_action_is_not_pending() {
        let protocol = Scripted::new(vec![Ok(RunState::Active)], ResultKind::Err);
        let mut monitor = ServiceMonitor::new(protocol, host());

        monitor.refresh(None).await.unwrap();
        let result = monitor.perform(ServiceAction::Restart, None).await.unwrap();
        assert_eq!(result.kind, ResultKind::Err);
        assert_eq!(monitor.pending_action(), None);
    }

    #[tokio::test]
    async fn test_failure_moves_to_error_and_retry_recovers() {
        let protocol = Scripted::new(
            vec![Ok(RunState::Active), Err(refused()), Ok(RunState::Stopped)],
            ResultKind::Ok,
        );
        let mut monitor = ServiceMonitor::new(protocol, host());

        monitor.refresh(None).await.unwrap();
        assert!(monitor.refresh(None).await.is_err());
        assert!(matches!(monitor.state(), ServiceState::Error(_)));
        // Last good status is kept
        assert_eq!(monitor.last_status().unwrap().status, RunState::Active);

        monitor.refresh(None).await.unwrap();
        assert_eq!(*monitor.state(), ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_retry_policy_applies_to_refresh() {
        let protocol = Scripted::new(vec![Err(refused()), Ok(RunState::Active)], ResultKind::Ok);
        let mut monitor = ServiceMonitor::new(protocol, host())
            .with_retry(RetryPolicy::new(2, crate::resilience::Backoff::Immediate));

        monitor.refresh(None).await.unwrap();
        assert_eq!(*monitor.state(), ServiceState::Active);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_keeps_state() {
        let protocol = Scripted::new(vec![Ok(RunState::Active), Err(ApiError::Cancelled)], ResultKind::Ok);
        let mut monitor = ServiceMonitor::new(protocol, host());

        monitor.refresh(None).await.unwrap();
        assert!(matches!(monitor.refresh(None).await, Err(ApiError::Cancelled)));
        assert_eq!(*monitor.state(), ServiceState::Active);
    }

    /// Always reports `active`; the first call can be made slow
    struct Paced {
        first_delay: Duration,
        calls: Mutex<Vec<tokio::time::Instant>>,
    }

    impl Paced {
        fn new(first_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                first_delay,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ServiceProtocol for Paced {
        fn name(&self) -> &'static str {
            "nginx"
        }

        fn display_name(&self) -> &'static str {
            "Nginx"
        }

        fn actions(&self) -> &'static [ServiceAction] {
            &ServiceAction::BASIC
        }

        async fn status(&self, _host: &HostId, _cancel: Option<&CancellationToken>) -> ApiResult<StatusSummary> {
            let first = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(tokio::time::Instant::now());
                calls.len() == 1
            };
            if first {
                tokio::time::sleep(self.first_delay).await;
            }
            Ok(StatusSummary {
                service: "nginx",
                hostname: "web-01".to_string(),
                status: RunState::Active,
                cpu: 0.5,
                memory: 8.0,
                connections: 2,
                logs: Vec::new(),
            })
        }

        async fn status_json(
            &self,
            _host: &HostId,
            _cancel: Option<&CancellationToken>,
        ) -> ApiResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        async fn action(
            &self,
            _host: &HostId,
            _action: ServiceAction,
            _cancel: Option<&CancellationToken>,
        ) -> ApiResult<ActionResult> {
            Ok(ActionResult {
                kind: ResultKind::Ok,
                message: "done".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_watch_streams_scripted_states() {
        let protocol = Scripted::new(
            vec![Ok(RunState::Active), Err(refused()), Ok(RunState::Stopped)],
            ResultKind::Ok,
        );
        let monitor = ServiceMonitor::new(protocol, host());
        let cancel = CancellationToken::new();

        let mut stream = monitor.watch(Duration::from_millis(10), cancel.clone());

        assert!(matches!(stream.next().await, Some(MonitorEvent::Refreshed(s)) if s.status == RunState::Active));
        assert!(matches!(stream.next().await, Some(MonitorEvent::Failed(_))));
        assert!(matches!(stream.next().await, Some(MonitorEvent::Refreshed(s)) if s.status == RunState::Stopped));
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_watch_stops_when_cancelled() {
        let protocol = Paced::new(Duration::ZERO);
        let monitor = ServiceMonitor::new(protocol.clone(), host());
        let cancel = CancellationToken::new();

        let mut stream = monitor.watch(Duration::from_millis(10), cancel.clone());
        assert!(matches!(stream.next().await, Some(MonitorEvent::Refreshed(_))));
        assert!(matches!(stream.next().await, Some(MonitorEvent::Refreshed(_))));

        cancel.cancel();
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while stream.next().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "watch kept running after cancellation");

        // No polls after the stream closed
        let calls = protocol.call_times().len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(protocol.call_times().len(), calls);
    }

    #[tokio::test]
    async fn test_watch_does_not_burst_after_slow_fetch() {
        let interval = Duration::from_millis(50);
        let protocol = Paced::new(Duration::from_millis(300));
        let monitor = ServiceMonitor::new(protocol.clone(), host());
        let cancel = CancellationToken::new();

        let mut stream = monitor.watch(interval, cancel.clone());
        for _ in 0..4 {
            assert!(matches!(stream.next().await, Some(MonitorEvent::Refreshed(_))));
        }
        cancel.cancel();

        let calls = protocol.call_times();
        assert!(calls.len() >= 4);
        // The poll right after the slow one may run at once; later polls keep the interval
        for pair in calls[1..4].windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(40), "polls {:?} apart", gap);
        }
    }
}
