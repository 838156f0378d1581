use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service rejected the user token. The token has been (or
    /// must be) cleared and the user has to pair again.
    #[error("Invalid user token")]
    InvalidToken,

    #[error("Unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No stub file available for {minutes} minutes")]
    StubUnavailable { minutes: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShelfError {
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, ShelfError::InvalidToken)
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
