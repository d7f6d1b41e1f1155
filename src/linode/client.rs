use std::net::IpAddr;

use serde::de::DeserializeOwned;
use snafu::prelude::*;

use crate::common::{
    Domain, DomainRecord, Provider, RecordKind, RequestSnafu, ResponseSnafu, Result, StatusSnafu,
    TIMEOUT,
};

use super::models::{CreateRecord, Page, UpdateTarget};

pub const API_BASE_URL: &str = "https://api.linode.com/v4";

const PROVIDER_NAME: &str = "Linode";

enum WriteMethod {
    Create,
    Update,
}

impl WriteMethod {
    fn verb(&self) -> &'static str {
        match self {
            WriteMethod::Create => "POST",
            WriteMethod::Update => "PUT",
        }
    }
}

/// Turns transport errors and any status other than 200 into [`crate::common::Error`].
fn check_response(
    method: &str,
    url: &str,
    result: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response> {
    let resp = match result {
        Ok(resp) => resp,
        Err(ureq::Error::Status(status, resp)) => {
            return StatusSnafu {
                url,
                method,
                status,
                body: resp.into_string().unwrap_or_default(),
            }
            .fail()
        }
        Err(err) => return Err(err).context(RequestSnafu { url, method }),
    };

    if resp.status() != 200 {
        let status = resp.status();
        return StatusSnafu {
            url,
            method,
            status,
            body: resp.into_string().unwrap_or_default(),
        }
        .fail();
    }

    Ok(resp)
}

pub struct LinodeClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl LinodeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, API_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_agent(
            ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
            api_key,
            base_url,
        )
    }

    /// Uses `agent` as is, including its timeouts.
    pub fn with_agent(
        agent: ureq::Agent,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn with_headers(&self, req: ureq::Request) -> ureq::Request {
        req.set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
    }

    /// Only the first page is read; further pages are reported and dropped.
    fn api_get<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(
            url = url.as_str(),
            method = "GET",
            provider = PROVIDER_NAME,
            "Sending request"
        );

        let resp = check_response(
            "GET",
            &url,
            self.with_headers(self.agent.get(&url)).call(),
        )?;

        let page: Page<T> = resp
            .into_json()
            .boxed_local()
            .context(ResponseSnafu {
                message: format!("Failed to deserialize response from {url}"),
            })?;

        if page.pages > 1 {
            tracing::warn!(
                url = url.as_str(),
                page = page.page,
                pages = page.pages,
                results = page.results,
                "Pagination is not supported, only the first page was read"
            );
        }

        Ok(page.data)
    }

    fn api_write(&self, path: &str, method: WriteMethod, body: impl serde::Serialize) -> Result<()> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(
            url = url.as_str(),
            method = method.verb(),
            provider = PROVIDER_NAME,
            "Sending request"
        );

        let req = self
            .with_headers(self.agent.request(method.verb(), &url))
            .set("Content-Type", "application/json");

        check_response(method.verb(), &url, req.send_json(body))?;
        Ok(())
    }
}

impl Provider for LinodeClient {
    fn list_domains(&self) -> Result<Vec<Domain>> {
        self.api_get("domains")
    }

    fn list_domain_records(&self, domain_id: u64) -> Result<Vec<DomainRecord>> {
        self.api_get(&format!("domains/{domain_id}/records"))
    }

    fn update_record_target(&self, domain_id: u64, record_id: u64, target: IpAddr) -> Result<()> {
        let target = target.to_string();
        self.api_write(
            &format!("domains/{domain_id}/records/{record_id}"),
            WriteMethod::Update,
            UpdateTarget { target: &target },
        )
    }

    fn create_host_record(
        &self,
        domain_id: u64,
        host: &str,
        kind: RecordKind,
        target: IpAddr,
    ) -> Result<()> {
        let target = target.to_string();
        self.api_write(
            &format!("domains/{domain_id}/records"),
            WriteMethod::Create,
            CreateRecord {
                name: host,
                kind,
                target: &target,
            },
        )
    }
}

impl From<&crate::Config> for LinodeClient {
    fn from(value: &crate::Config) -> Self {
        Self::new(value.token.clone())
    }
}
