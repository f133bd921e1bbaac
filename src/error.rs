use thiserror::Error;

/// Problems with the process environment, all fatal at startup
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Environment variable {name} is not a valid id: {value}")]
    InvalidId { name: &'static str, value: String },
}

/// Failures talking to the music service.
///
/// Display is the raw underlying text so handlers can echo it to chat.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Any failed API call: network, expired auth, bad device, rate limit
    #[error("{0}")]
    Api(String),

    /// A link carried an id the service does not accept
    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("authorization failed: {0}")]
    Auth(String),
}

impl From<rspotify::ClientError> for RemoteError {
    fn from(err: rspotify::ClientError) -> Self {
        Self::Api(err.to_string())
    }
}

impl From<rspotify::model::IdError> for RemoteError {
    fn from(err: rspotify::model::IdError) -> Self {
        Self::InvalidId(err.to_string())
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
