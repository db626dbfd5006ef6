use thiserror::Error;

/// Why a remote preview did not produce storefront HTML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    /// The storefront answered with a password or login challenge
    #[error("{0}")]
    Blocked(String),

    #[error("Proxy error: {status} {reason}")]
    Http { status: u16, reason: String },

    #[error("{0}")]
    SizeLimit(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// A newer request replaced this one before it finished
    #[error("Request superseded")]
    Superseded,
}

impl TransportError {
    pub fn timeout() -> Self {
        TransportError::Timeout("Request timeout".to_string())
    }

    pub fn size_limit(what: &str, limit: usize) -> Self {
        TransportError::SizeLimit(format!("{} exceeds maximum length of {} bytes", what, limit))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        TransportError::InvalidRequest(message.into())
    }

    /// Whether the local renderer should stand in for this failure.
    ///
    /// Size and parameter errors are the author's to fix and are reported
    /// as-is. A superseded request has nothing left to show.
    pub fn degrades_to_local(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_)
                | TransportError::Network(_)
                | TransportError::Blocked(_)
                | TransportError::Http { .. }
        )
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, TransportError::Blocked(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::timeout()
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
