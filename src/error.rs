use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Everything that can go wrong between building a client and reading a result.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad client setup. Only ever produced while constructing a client.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The exchange never completed: connect failure, timeout, or a broken body stream.
    #[error("network error: {message}")]
    Network { message: String, timed_out: bool },

    /// The server answered, but not with a usable 2xx JSON object.
    #[error("invalid response{}: {reason}", status_suffix(.status))]
    InvalidResponse {
        status: Option<u16>,
        reason: String,
        body: Option<String>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl ClientError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_response(
        status: Option<u16>,
        reason: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self::InvalidResponse {
            status,
            reason: reason.into(),
            body,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timed_out: true, .. })
    }

    /// Raw response body kept for diagnostics, if the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::InvalidResponse { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidResponse { status, .. } => *status,
            _ => None,
        }
    }
}
