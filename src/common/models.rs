use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// Upper bound on every call made to the provider or to discovery endpoints.
pub const TIMEOUT: Duration = Duration::from_secs(15);

pub const RECORD_KIND_A: &str = "A";
pub const RECORD_KIND_AAAA: &str = "AAAA";

/// Host token standing for the bare domain.
pub const ROOT_HOST: &str = "@";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    A,
    Aaaa,
    Other(String),
}

impl RecordKind {
    pub fn version(&self) -> Option<IpVersion> {
        match self {
            RecordKind::A => Some(IpVersion::V4),
            RecordKind::Aaaa => Some(IpVersion::V6),
            RecordKind::Other(_) => None,
        }
    }
}

impl From<String> for RecordKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            RECORD_KIND_A => RecordKind::A,
            RECORD_KIND_AAAA => RecordKind::Aaaa,
            _ => RecordKind::Other(value),
        }
    }
}

impl From<RecordKind> for String {
    fn from(value: RecordKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::A => f.write_str(RECORD_KIND_A),
            RecordKind::Aaaa => f.write_str(RECORD_KIND_AAAA),
            RecordKind::Other(kind) => f.write_str(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    pub fn matches(&self, addr: &IpAddr) -> bool {
        match self {
            IpVersion::V4 => addr.is_ipv4(),
            IpVersion::V6 => addr.is_ipv6(),
        }
    }

    pub fn record_kind(&self) -> RecordKind {
        match self {
            IpVersion::V4 => RecordKind::A,
            IpVersion::V6 => RecordKind::Aaaa,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("IPv4"),
            IpVersion::V6 => f.write_str("IPv6"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Domain {
    pub id: u64,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct DomainRecord {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub target: String,
}

impl DomainRecord {
    /// Host tokens are trimmed before comparison, record names never are.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim();
        self.name == host || (self.name.is_empty() && host == ROOT_HOST)
    }
}

/// Public addresses discovered for the current pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalAddresses {
    pub v4: Option<Ipv4Addr>,
    pub v6: Option<Ipv6Addr>,
}

impl LocalAddresses {
    pub fn get(&self, version: IpVersion) -> Option<IpAddr> {
        match version {
            IpVersion::V4 => self.v4.map(IpAddr::V4),
            IpVersion::V6 => self.v6.map(IpAddr::V6),
        }
    }
}

/// A write the reconciler has decided to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Update {
        record_id: u64,
        name: String,
        kind: RecordKind,
        previous: String,
        target: IpAddr,
    },
    Create {
        host: String,
        kind: RecordKind,
        target: IpAddr,
    },
}

pub trait Provider {
    fn list_domains(&self) -> super::Result<Vec<Domain>>;
    fn list_domain_records(&self, domain_id: u64) -> super::Result<Vec<DomainRecord>>;
    fn update_record_target(
        &self,
        domain_id: u64,
        record_id: u64,
        target: IpAddr,
    ) -> super::Result<()>;
    fn create_host_record(
        &self,
        domain_id: u64,
        host: &str,
        kind: RecordKind,
        target: IpAddr,
    ) -> super::Result<()>;
}

pub trait AddressSource {
    /// Best effort: every failure is reported as `None`.
    fn discover(&self, version: IpVersion) -> Option<IpAddr>;
}
