use crate::common::{key_file_or_string, ConfigSnafu, Result};

pub const DEFAULT_IPV4_URL: &str = "https://ipv4.icanhazip.com";
pub const DEFAULT_IPV6_URL: &str = "https://ipv6.icanhazip.com";

fn default_ipv4_url() -> url::Url {
    url::Url::parse(DEFAULT_IPV4_URL).expect("default IPv4 URL is valid")
}

fn default_ipv6_url() -> url::Url {
    url::Url::parse(DEFAULT_IPV6_URL).expect("default IPv6 URL is valid")
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    /// Domain name exactly as the provider lists it.
    pub domain: String,

    /// Comma separated host labels, "@" for the bare domain.
    pub host: String,

    /// API token, or "@/path" to read it from a file.
    pub token: String,

    #[serde(default = "default_ipv4_url")]
    pub ipv4_url: url::Url,

    #[serde(default = "default_ipv6_url")]
    pub ipv6_url: url::Url,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_environment(config::Environment::default())
    }

    pub fn from_environment(source: config::Environment) -> Result<Self> {
        let mut cfg: Self = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|err| {
                ConfigSnafu {
                    message: err.to_string(),
                    prefix: "environment",
                }
                .build()
            })?;

        cfg.token = key_file_or_string(cfg.token, "TOKEN")?;

        if cfg.domain.trim().is_empty() {
            return ConfigSnafu {
                message: "DOMAIN must not be empty",
                prefix: "DOMAIN",
            }
            .fail();
        }

        Ok(cfg)
    }

    /// Host tokens in configured order, untrimmed.
    pub fn hosts(&self) -> Vec<&str> {
        self.host.split(',').collect()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("ipv4_url", &self.ipv4_url.as_str())
            .field("ipv6_url", &self.ipv6_url.as_str())
            .finish()
    }
}
