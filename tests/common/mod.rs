//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{IpAddr, TcpListener};
use std::sync::{Arc, Mutex};

use linode_dynamic_dns::common::{
    AddressSource, Domain, DomainRecord, IpVersion, Provider, RecordKind, Result, StatusSnafu,
};
use linode_dynamic_dns::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDomains,
    ListRecords(u64),
    Update {
        domain_id: u64,
        record_id: u64,
        target: String,
    },
    Create {
        domain_id: u64,
        host: String,
        kind: String,
        target: String,
    },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Update { .. } | Call::Create { .. })
    }
}

/// In-memory provider that records every call and applies writes to its own
/// record list, so consecutive passes observe earlier changes.
pub struct MockProvider {
    domains: Vec<Domain>,
    records: RefCell<Vec<DomainRecord>>,
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u64>,
    fail_status: Cell<u16>,
    failures_left: Cell<usize>,
    domain_listings_left: Cell<Option<usize>>,
}

impl MockProvider {
    pub fn new(domains: &[(u64, &str)], records: Vec<DomainRecord>) -> Self {
        Self {
            domains: domains
                .iter()
                .map(|(id, name)| Domain {
                    id: *id,
                    domain: name.to_string(),
                })
                .collect(),
            records: RefCell::new(records),
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1000),
            fail_status: Cell::new(0),
            failures_left: Cell::new(0),
            domain_listings_left: Cell::new(None),
        }
    }

    /// Every following update or create answers with this status.
    pub fn fail_writes_with(&self, status: u16) {
        self.fail_next_writes(status, usize::MAX);
    }

    /// The next `count` updates or creates answer with `status`.
    pub fn fail_next_writes(&self, status: u16, count: usize) {
        self.fail_status.set(status);
        self.failures_left.set(count);
    }

    /// Domains are listed `count` more times, then the list comes back empty.
    pub fn drop_domains_after(&self, count: usize) {
        self.domain_listings_left.set(Some(count));
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn records(&self) -> Vec<DomainRecord> {
        self.records.borrow().clone()
    }

    fn check_write(&self, method: &str) -> Result<()> {
        let left = self.failures_left.get();
        if left == 0 {
            return Ok(());
        }
        self.failures_left.set(left.saturating_sub(1));
        StatusSnafu {
            url: "mock://records",
            method,
            status: self.fail_status.get(),
            body: "{\"errors\": [{\"reason\": \"rejected\"}]}",
        }
        .fail()
    }
}

impl Provider for MockProvider {
    fn list_domains(&self) -> Result<Vec<Domain>> {
        self.calls.borrow_mut().push(Call::ListDomains);
        match self.domain_listings_left.get() {
            Some(0) => return Ok(Vec::new()),
            Some(left) => self.domain_listings_left.set(Some(left - 1)),
            None => {}
        }
        Ok(self.domains.clone())
    }

    fn list_domain_records(&self, domain_id: u64) -> Result<Vec<DomainRecord>> {
        self.calls.borrow_mut().push(Call::ListRecords(domain_id));
        Ok(self.records.borrow().clone())
    }

    fn update_record_target(&self, domain_id: u64, record_id: u64, target: IpAddr) -> Result<()> {
        self.calls.borrow_mut().push(Call::Update {
            domain_id,
            record_id,
            target: target.to_string(),
        });
        self.check_write("PUT")?;
        if let Some(record) = self
            .records
            .borrow_mut()
            .iter_mut()
            .find(|r| r.id == record_id)
        {
            record.target = target.to_string();
        }
        Ok(())
    }

    fn create_host_record(
        &self,
        domain_id: u64,
        host: &str,
        kind: RecordKind,
        target: IpAddr,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call::Create {
            domain_id,
            host: host.to_string(),
            kind: kind.to_string(),
            target: target.to_string(),
        });
        self.check_write("POST")?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.records.borrow_mut().push(DomainRecord {
            id,
            name: host.to_string(),
            kind,
            target: target.to_string(),
        });
        Ok(())
    }
}

/// Address source returning fixed answers and counting lookups.
pub struct FixedAddresses {
    pub v4: Option<IpAddr>,
    pub v6: Option<IpAddr>,
    lookups: Cell<usize>,
}

impl FixedAddresses {
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
        Self {
            v4: v4.map(|ip| ip.parse().unwrap()),
            v6: v6.map(|ip| ip.parse().unwrap()),
            lookups: Cell::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl AddressSource for FixedAddresses {
    fn discover(&self, version: IpVersion) -> Option<IpAddr> {
        self.lookups.set(self.lookups.get() + 1);
        match version {
            IpVersion::V4 => self.v4,
            IpVersion::V6 => self.v6,
        }
    }
}

pub fn record(id: u64, name: &str, kind: &str, target: &str) -> DomainRecord {
    DomainRecord {
        id,
        name: name.to_string(),
        kind: RecordKind::from(kind.to_string()),
        target: target.to_string(),
    }
}

pub fn config(domain: &str, host: &str) -> Config {
    Config {
        domain: domain.to_string(),
        host: host.to_string(),
        token: "test-token".to_string(),
        ipv4_url: url::Url::parse("http://127.0.0.1:9/v4").unwrap(),
        ipv6_url: url::Url::parse("http://127.0.0.1:9/v6").unwrap(),
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Minimal HTTP/1.1 server answering queued responses, one per connection.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                recorded.lock().unwrap().push(read_request(&mut reader));

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base_url, requests }
    }

    /// Accepts connections but never answers, holding each one for `hold`.
    pub fn start_silent(hold: std::time::Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(hold);
                drop(stream);
            }
        });

        Self {
            base_url,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(reader: &mut impl BufRead) -> RecordedRequest {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_string(), v.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();

    RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8(body).unwrap(),
    }
}
