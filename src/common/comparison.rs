use std::net::IpAddr;

use snafu::ResultExt;

use super::{Change, DomainRecord, IpVersion, LocalAddresses, ResponseSnafu, Result, ROOT_HOST};

/// Decide which writes bring `host` in line with the local addresses.
///
/// Every record matching the host is reconciled against the address of its
/// family. Hosts with no matching record get one new record per discovered
/// family, unless the host is the bare domain.
///
/// A matched A/AAAA record whose target is not an IP address is an error.
pub(crate) fn plan_host(
    host: &str,
    records: &[DomainRecord],
    local: &LocalAddresses,
) -> Result<Vec<Change>> {
    let host = host.trim();
    let mut changes = Vec::new();
    let mut found = false;

    for record in records.iter().filter(|r| r.matches(host)) {
        found = true;
        tracing::debug!(
            host,
            name = record.name.as_str(),
            kind = %record.kind,
            record_target = record.target.as_str(),
            "Found matching record"
        );

        let Some(version) = record.kind.version() else {
            tracing::debug!(
                host,
                kind = %record.kind,
                record_id = record.id,
                "Skipping record of unsupported kind"
            );
            continue;
        };

        let Some(local_ip) = local.get(version) else {
            continue;
        };

        if !target_is_current(record, local_ip)? {
            changes.push(Change::Update {
                record_id: record.id,
                name: record.name.clone(),
                kind: record.kind.clone(),
                previous: record.target.clone(),
                target: local_ip,
            });
        }
    }

    if !found && !host.is_empty() && host != ROOT_HOST {
        for version in [IpVersion::V4, IpVersion::V6] {
            if let Some(target) = local.get(version) {
                changes.push(Change::Create {
                    host: host.to_string(),
                    kind: version.record_kind(),
                    target,
                });
            }
        }
    }

    Ok(changes)
}

// Compared as addresses so that equivalent IPv6 spellings are not rewritten.
fn target_is_current(record: &DomainRecord, local: IpAddr) -> Result<bool> {
    let current = record
        .target
        .trim()
        .parse::<IpAddr>()
        .boxed_local()
        .context(ResponseSnafu {
            message: format!(
                "Record {} ({} {:?}) has target {:?}, which is not an IP address",
                record.id, record.kind, record.name, record.target
            ),
        })?;
    Ok(current == local)
}
