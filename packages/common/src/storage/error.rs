use thiserror::Error;

/// Errors that can occur during PDF archive operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No stored PDF matches the given hash.
    #[error("stored PDF not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("PDF archive IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The provided content hash is malformed.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
    /// The file exceeds the configured size limit.
    #[error("PDF exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The uploaded bytes do not start with a PDF header.
    #[error("uploaded file is not a PDF")]
    NotAPdf,
}
