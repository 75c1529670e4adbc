// Composition root: one bus, one client, shared by every consumer

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::events::{EventBus, SubscriptionGuard, AUTH_FORBIDDEN, AUTH_UNAUTHORIZED};
use crate::monitor::ServiceMonitor;
use crate::protocol::{HostDirectory, HostId, ServiceKind, ServiceProtocol};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session flags raised by auth events
#[derive(Debug, Default)]
pub struct SessionState {
    expired: AtomicBool,
    forbidden: AtomicBool,
}

impl SessionState {
    /// True once any call came back 401
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    /// True once any call came back 403
    pub fn is_forbidden(&self) -> bool {
        self.forbidden.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.expired.store(false, Ordering::SeqCst);
        self.forbidden.store(false, Ordering::SeqCst);
    }

    /// Hint for the user after an auth failure, if any occurred
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_expired() {
            Some("Session expired or missing. Log in again and export CHM_SESSION=<cookie>.")
        } else if self.is_forbidden() {
            Some("The current session is not allowed to perform this operation.")
        } else {
            None
        }
    }
}

/// Main application state
pub struct App {
    pub config: Config,
    pub bus: EventBus,
    pub api: ApiClient,
    pub session: Arc<SessionState>,
    _auth_listeners: Vec<SubscriptionGuard>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let bus = EventBus::new();
        let api = ApiClient::new(&config.client_config(), bus.clone())?;
        Ok(Self::assemble(config, bus, api))
    }

    /// Wire an existing bus and client together
    pub fn assemble(config: Config, bus: EventBus, api: ApiClient) -> Self {
        let session = Arc::new(SessionState::default());

        let expired = session.clone();
        let on_unauthorized = bus
            .subscribe(AUTH_UNAUTHORIZED, move |_| {
                tracing::warn!("Backend rejected the session (401)");
                expired.expired.store(true, Ordering::SeqCst);
            })
            .guard();

        let forbidden = session.clone();
        let on_forbidden = bus
            .subscribe(AUTH_FORBIDDEN, move |_| {
                tracing::warn!("Backend refused access (403)");
                forbidden.forbidden.store(true, Ordering::SeqCst);
            })
            .guard();

        Self {
            config,
            bus,
            api,
            session,
            _auth_listeners: vec![on_unauthorized, on_forbidden],
        }
    }

    pub fn service(&self, kind: ServiceKind) -> Arc<dyn ServiceProtocol> {
        kind.client(self.api.clone())
    }

    pub fn hosts(&self) -> HostDirectory {
        HostDirectory::new(self.api.clone())
    }

    pub fn monitor(&self, kind: ServiceKind, host: HostId) -> ServiceMonitor {
        ServiceMonitor::new(self.service(kind), host).with_retry(self.config.retry_policy())
    }
}
