//! Error types surfaced by the query pipeline.

use thiserror::Error;

/// The process cannot be configured to serve requests. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required environment variable is unset or blank.
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    /// A setting is present but unusable.
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The outbound model call failed. Never retried.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// Connection failures, DNS resolution, TLS, etc.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status from the model service.
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered but the body carried no usable completion.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteCallError::Timeout(err)
        } else if err.is_decode() {
            RemoteCallError::Malformed(err.to_string())
        } else {
            RemoteCallError::Network(err)
        }
    }
}
