use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsRampError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl OpsRampError {
    /// Short, stable label used in run reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            OpsRampError::Authentication(_) => "authentication_failure",
            OpsRampError::Transport { .. } => "transport_failure",
            OpsRampError::Status { .. } => "http_status",
            OpsRampError::Decode { .. } => "invalid_response",
            OpsRampError::Config(_) => "configuration",
        }
    }
}

pub type Result<T, E = OpsRampError> = std::result::Result<T, E>;
