use std::net::IpAddr;

use crate::common::{AddressSource, IpVersion, TIMEOUT};

/// Looks up the public address by asking an IP-echo service.
pub struct HttpAddressSource {
    agent: ureq::Agent,
    ipv4_url: url::Url,
    ipv6_url: url::Url,
}

impl HttpAddressSource {
    pub fn new(ipv4_url: url::Url, ipv6_url: url::Url) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            ipv4_url,
            ipv6_url,
        }
    }

    fn url(&self, version: IpVersion) -> &url::Url {
        match version {
            IpVersion::V4 => &self.ipv4_url,
            IpVersion::V6 => &self.ipv6_url,
        }
    }
}

impl AddressSource for HttpAddressSource {
    fn discover(&self, version: IpVersion) -> Option<IpAddr> {
        let url = self.url(version);
        tracing::info!(%version, url = url.as_str(), "Discovering local address");

        let body = match self.agent.get(url.as_str()).call() {
            Ok(resp) => resp.into_string(),
            Err(err) => {
                tracing::info!(%version, error = %err, "Address discovery request failed");
                return None;
            }
        };

        let body = match body {
            Ok(body) => body,
            Err(err) => {
                tracing::info!(%version, error = %err, "Failed to read discovery response");
                return None;
            }
        };

        match parse_address(&body, version) {
            Some(ip) => {
                tracing::info!(%version, %ip, "Discovered local address");
                Some(ip)
            }
            None => {
                tracing::info!(%version, "No local address");
                None
            }
        }
    }
}

impl From<&crate::Config> for HttpAddressSource {
    fn from(value: &crate::Config) -> Self {
        Self::new(value.ipv4_url.clone(), value.ipv6_url.clone())
    }
}

pub(crate) fn parse_address(body: &str, version: IpVersion) -> Option<IpAddr> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match body.parse::<IpAddr>() {
        Ok(ip) if version.matches(&ip) => Some(ip),
        Ok(ip) => {
            tracing::debug!(%version, %ip, "Discovered address has the wrong version");
            None
        }
        Err(_) => {
            tracing::debug!(%version, body, "Discovery response is not an IP address");
            None
        }
    }
}
