use thiserror::Error;

/// Common error type shared by the blocksmith crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Resource '{handle}' could not be fetched: {message}")]
    Fetch { handle: String, message: String },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CommonError {
    pub fn fetch(handle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            handle: handle.into(),
            message: message.into(),
        }
    }
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}
