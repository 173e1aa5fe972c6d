use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::hash::ContentHash;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed archive of escritura PDFs.
///
/// Uploads arrive as whole byte buffers (deed PDFs are bounded by the
/// multipart body limit); downloads can stream.
#[async_trait]
pub trait PdfStore: Send + Sync {
    /// Store a PDF and return its content hash. Rejects bytes that do not
    /// carry a PDF header and files over the configured size limit.
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError>;

    /// Retrieve all bytes of a stored PDF.
    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError>;

    /// Open a stored PDF as a streaming async reader.
    async fn open_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError>;

    /// Check whether a PDF exists.
    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Delete a stored PDF.
    ///
    /// Returns `true` if it was deleted, `false` if it did not exist.
    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Size of a stored PDF in bytes.
    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError>;
}
