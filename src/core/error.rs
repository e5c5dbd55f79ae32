use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store not ready")]
    NotReady,

    #[error("Malformed identifier: {0}")]
    InvalidObjectId(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Field '{0}' is immutable")]
    ImmutableField(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SnapshotError(err.to_string())
    }
}
