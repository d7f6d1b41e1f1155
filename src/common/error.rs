use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{method} {url} failed: {source}"))]
    RequestError {
        url: String,
        method: String,
        source: ureq::Error,
    },
    #[snafu(display("{method} {url} returned status {status}: {body}"))]
    StatusError {
        url: String,
        method: String,
        status: u16,
        body: String,
    },
    #[snafu(display("{message}: {source}"))]
    ResponseError {
        message: String,
        source: Box<dyn std::error::Error>,
    },
    #[snafu(display("Invalid configuration for {prefix}: {message}"))]
    ConfigError { message: String, prefix: String },
    #[snafu(display("Domain \"{domain}\" not found"))]
    DomainNotFound { domain: String },
}

impl Error {
    /// Process status the CLI exits with when this error is fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigError { .. } => 2,
            _ => 1,
        }
    }

    /// Whether a continuous run should stop rather than retry on the next pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigError { .. } | Error::DomainNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
