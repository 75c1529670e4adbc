// Managed service definitions

pub mod apache;
pub mod bind;
pub mod dhcp;
pub mod ldap;
pub mod mysql;
pub mod nginx;
pub mod proftpd;
pub mod samba;
pub mod squid;
pub mod ssh;

pub use apache::{Apache, ApacheLogs};
pub use bind::{Bind, BindLogs, QueryLogEntry};
pub use dhcp::{Dhcp, DhcpLogs, LeaseLogEntry};
pub use ldap::{Ldap, LdapAuditEntry, LdapLogs};
pub use mysql::{Mysql, MysqlLogs, SqlQueryEntry};
pub use nginx::{Nginx, NginxLogs};
pub use proftpd::{Proftpd, ProftpdLogs, TransferLogEntry};
pub use samba::{Samba, SambaLogs, ShareAuditEntry};
pub use squid::{ProxyAccessEntry, Squid, SquidLogs};
pub use ssh::{AuthLogEntry, Ssh, SshLogs};

use crate::api::ApiClient;
use crate::error::ChmError;
use crate::protocol::{ManagedService, ServiceAction, ServiceClient, ServiceProtocol};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Runtime selector for a managed service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ServiceKind {
    Apache,
    Nginx,
    Bind,
    Dhcp,
    Ldap,
    Mysql,
    Proftpd,
    Samba,
    Squid,
    Ssh,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 10] = [
        ServiceKind::Apache,
        ServiceKind::Nginx,
        ServiceKind::Bind,
        ServiceKind::Dhcp,
        ServiceKind::Ldap,
        ServiceKind::Mysql,
        ServiceKind::Proftpd,
        ServiceKind::Samba,
        ServiceKind::Squid,
        ServiceKind::Ssh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Apache => Apache::NAME,
            ServiceKind::Nginx => Nginx::NAME,
            ServiceKind::Bind => Bind::NAME,
            ServiceKind::Dhcp => Dhcp::NAME,
            ServiceKind::Ldap => Ldap::NAME,
            ServiceKind::Mysql => Mysql::NAME,
            ServiceKind::Proftpd => Proftpd::NAME,
            ServiceKind::Samba => Samba::NAME,
            ServiceKind::Squid => Squid::NAME,
            ServiceKind::Ssh => Ssh::NAME,
        }
    }

    pub fn actions(&self) -> &'static [ServiceAction] {
        match self {
            ServiceKind::Apache => Apache::actions(),
            ServiceKind::Nginx => Nginx::actions(),
            ServiceKind::Bind => Bind::actions(),
            ServiceKind::Dhcp => Dhcp::actions(),
            ServiceKind::Ldap => Ldap::actions(),
            ServiceKind::Mysql => Mysql::actions(),
            ServiceKind::Proftpd => Proftpd::actions(),
            ServiceKind::Samba => Samba::actions(),
            ServiceKind::Squid => Squid::actions(),
            ServiceKind::Ssh => Ssh::actions(),
        }
    }

    /// Type-erased client for this service
    pub fn client(&self, api: ApiClient) -> Arc<dyn ServiceProtocol> {
        match self {
            ServiceKind::Apache => Arc::new(ServiceClient::<Apache>::new(api)),
            ServiceKind::Nginx => Arc::new(ServiceClient::<Nginx>::new(api)),
            ServiceKind::Bind => Arc::new(ServiceClient::<Bind>::new(api)),
            ServiceKind::Dhcp => Arc::new(ServiceClient::<Dhcp>::new(api)),
            ServiceKind::Ldap => Arc::new(ServiceClient::<Ldap>::new(api)),
            ServiceKind::Mysql => Arc::new(ServiceClient::<Mysql>::new(api)),
            ServiceKind::Proftpd => Arc::new(ServiceClient::<Proftpd>::new(api)),
            ServiceKind::Samba => Arc::new(ServiceClient::<Samba>::new(api)),
            ServiceKind::Squid => Arc::new(ServiceClient::<Squid>::new(api)),
            ServiceKind::Ssh => Arc::new(ServiceClient::<Ssh>::new(api)),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = ChmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        ServiceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ChmError::UnknownService(s.to_string()))
    }
}
