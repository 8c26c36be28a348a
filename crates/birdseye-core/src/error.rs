use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Serialization(err.to_string())
    }
}

impl BoardError {
    /// True for failures reported by the backend itself rather than the
    /// transport in between.
    pub fn is_remote(&self) -> bool {
        matches!(self, BoardError::Remote { .. })
    }
}
