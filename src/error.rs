use crate::types::ErrorKind;
use thiserror::Error;

/// Client error types.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not connected")]
    NotConnected,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("connect timed out after {0}ms")]
    ConnectTimeout(u64),

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl ClientError {
    /// Coarse classification for the read-only status surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotConnected => ErrorKind::NotConnected,
            ClientError::Connection(_) | ClientError::ConnectTimeout(_) => ErrorKind::Connection,
            ClientError::Decode(_) | ClientError::SerdeJson(_) => ErrorKind::Decode,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
