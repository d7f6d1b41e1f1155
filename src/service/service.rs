use std::net::IpAddr;
use std::time::Duration;

use crate::common::{
    plan_host, AddressSource, Change, DomainNotFoundSnafu, IpVersion, LocalAddresses, Provider,
    Result,
};
use crate::Config;

use super::PassReport;

pub struct Reconciler<'a> {
    config: &'a Config,
    provider: &'a dyn Provider,
    addresses: &'a dyn AddressSource,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a Config,
        provider: &'a dyn Provider,
        addresses: &'a dyn AddressSource,
    ) -> Self {
        Self {
            config,
            provider,
            addresses,
            dry_run: false,
        }
    }

    /// Plan and log changes without sending any writes.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn resolve_domain(&self) -> Result<u64> {
        let domain = &self.config.domain;
        match self
            .provider
            .list_domains()?
            .into_iter()
            .find(|d| &d.domain == domain)
        {
            Some(d) => {
                tracing::debug!(domain = domain.as_str(), domain_id = d.id, "Resolved domain");
                Ok(d.id)
            }
            None => DomainNotFoundSnafu { domain }.fail(),
        }
    }

    pub fn discover(&self) -> LocalAddresses {
        LocalAddresses {
            v4: match self.addresses.discover(IpVersion::V4) {
                Some(IpAddr::V4(ip)) => Some(ip),
                _ => None,
            },
            v6: match self.addresses.discover(IpVersion::V6) {
                Some(IpAddr::V6(ip)) => Some(ip),
                _ => None,
            },
        }
    }

    /// One reconciliation of every configured host. The first provider error
    /// aborts the pass, leaving earlier hosts already applied.
    pub fn run_pass(&self) -> Result<PassReport> {
        let domain_id = self.resolve_domain()?;
        let local = self.discover();
        let mut report = PassReport::default();

        for host in self.config.hosts() {
            // Re-read per host so records created for earlier hosts are seen.
            let records = self.provider.list_domain_records(domain_id)?;
            tracing::debug!(host, records = records.len(), "Read records");

            for change in plan_host(host, &records, &local)? {
                self.apply(domain_id, &change)?;
                match change {
                    Change::Update { .. } => report.updated += 1,
                    Change::Create { .. } => report.created += 1,
                }
            }
        }

        if report.is_empty() {
            tracing::info!(domain = self.config.domain.as_str(), "No changes detected");
        } else {
            tracing::info!(
                domain = self.config.domain.as_str(),
                update = report.updated,
                create = report.created,
                dry_run = self.dry_run,
                "Pass completed"
            );
        }

        Ok(report)
    }

    fn apply(&self, domain_id: u64, change: &Change) -> Result<()> {
        match change {
            Change::Update {
                record_id,
                name,
                kind,
                previous,
                target,
            } => {
                tracing::info!(
                    name = name.as_str(),
                    kind = %kind,
                    record_id,
                    previous = previous.as_str(),
                    %target,
                    dry_run = self.dry_run,
                    "Updating record"
                );
                if !self.dry_run {
                    self.provider
                        .update_record_target(domain_id, *record_id, *target)?;
                }
            }
            Change::Create { host, kind, target } => {
                tracing::info!(
                    name = host.as_str(),
                    kind = %kind,
                    %target,
                    dry_run = self.dry_run,
                    "Creating record"
                );
                if !self.dry_run {
                    self.provider
                        .create_host_record(domain_id, host, kind.clone(), *target)?;
                }
            }
        }
        Ok(())
    }

    /// Runs a single pass, or passes forever `interval` apart.
    ///
    /// In continuous mode a failed pass is logged and retried after the
    /// interval; only fatal errors end the loop.
    pub fn run(&self, interval: Option<Duration>) -> Result<()> {
        let Some(interval) = interval else {
            return self.run_pass().map(|_| ());
        };

        loop {
            match self.run_pass() {
                Ok(_) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        retry_in = interval.as_secs(),
                        "Pass failed"
                    );
                }
            }
            std::thread::sleep(interval);
        }
    }
}
