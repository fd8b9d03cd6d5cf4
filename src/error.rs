// Error type shared by the API client and the command handlers. Each
// variant maps to a process exit code so `main` stays a thin shell.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can stop a single invocation from completing.
#[derive(Debug, Error)]
pub enum TalksError {
    /// `new` was called without one of name, type or desc.
    #[error("One of the three fields is null. Exiting...")]
    MissingField,

    /// The request never produced a response (DNS, refused, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expected.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with a non-success status.
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The outgoing talk could not be serialized.
    #[error("could not encode talk: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TalksError {
    /// Map the error to a process exit code (sysexits-style where one fits).
    pub fn exit_code(&self) -> u8 {
        match self {
            TalksError::MissingField => 1,
            TalksError::Transport { .. } => 69, // EX_UNAVAILABLE
            TalksError::Status { .. } => 69,
            TalksError::Decode { .. } => 65, // EX_DATAERR
            TalksError::Encode(_) => 70,     // EX_SOFTWARE
            TalksError::Config(_) => 78,     // EX_CONFIG
            TalksError::Io(_) => 74,         // EX_IOERR
        }
    }
}
