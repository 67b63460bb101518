use thiserror::Error;

/// Client-side URL check failures. Never sent to the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    Empty,

    #[error("URL must start with http:// or https://")]
    MissingScheme,
}

/// The only error the API client returns. `Display` is the user-visible message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Decode(String),
}

impl BackendError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Failures while building the API client.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("API base URL cannot carry a path: {0}")]
    NotABase(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
