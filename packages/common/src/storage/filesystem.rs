use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BoxReader, PdfStore};

/// Every PDF starts with this magic, whatever its version.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Filesystem-backed PDF archive.
///
/// Files land in a Git-style sharded layout,
/// `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}`, written to a
/// temp file first and renamed into place so a crashed upload never leaves
/// a half-written PDF under its final name.
pub struct FilesystemPdfStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemPdfStore {
    /// Create a new archive rooted at `base_path`.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn pdf_path(&self, hash: &ContentHash) -> PathBuf {
        let hex = hash.to_hex();
        self.base_path.join(&hex[..2]).join(&hex[2..])
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl PdfStore for FilesystemPdfStore {
    async fn put(&self, data: &[u8]) -> Result<ContentHash, StorageError> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(StorageError::NotAPdf);
        }
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let hash = ContentHash::compute(data);
        let pdf_path = self.pdf_path(&hash);

        // Content-addressed: identical re-uploads are a no-op.
        if pdf_path.exists() {
            return Ok(hash);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = pdf_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &pdf_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(hash)
    }

    async fn get(&self, hash: &ContentHash) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.pdf_path(hash)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn open_stream(&self, hash: &ContentHash) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.pdf_path(hash)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.pdf_path(hash)).await?)
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        match fs::remove_file(self.pdf_path(hash)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, hash: &ContentHash) -> Result<u64, StorageError> {
        match fs::metadata(self.pdf_path(hash)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(hash.to_hex()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (FilesystemPdfStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPdfStore::new(dir.path().join("pdfs"), 1024 * 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_get_round_trip() {
        let (store, _dir) = temp_store().await;
        let data = b"%PDF-1.7\nescritura";
        let hash = store.put(data).await.unwrap();
        assert_eq!(store.get(&hash).await.unwrap(), data);
        assert!(store.exists(&hash).await.unwrap());
        assert_eq!(store.size(&hash).await.unwrap(), data.len() as u64);
    }

    #[tokio::test]
    async fn identical_uploads_share_one_file() {
        let (store, _dir) = temp_store().await;
        let data = b"%PDF-1.4 same deed";
        let h1 = store.put(data).await.unwrap();
        let h2 = store.put(data).await.unwrap();
        assert_eq!(h1, h2);

        let path = store.pdf_path(&h1);
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_rejected() {
        let (store, _dir) = temp_store().await;
        assert!(matches!(
            store.put(b"PK\x03\x04 not a pdf").await,
            Err(StorageError::NotAPdf)
        ));
    }

    #[tokio::test]
    async fn oversized_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemPdfStore::new(dir.path().join("pdfs"), 16)
            .await
            .unwrap();
        let result = store.put(b"%PDF-1.7 far too many bytes for the limit").await;
        assert!(matches!(
            result,
            Err(StorageError::SizeLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn missing_pdfs_report_not_found() {
        let (store, _dir) = temp_store().await;
        let hash = ContentHash::compute(b"never stored");
        assert!(matches!(
            store.get(&hash).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!store.delete(&hash).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let (store, _dir) = temp_store().await;
        let hash = store.put(b"%PDF-1.5 temp").await.unwrap();
        assert!(store.delete(&hash).await.unwrap());
        assert!(!store.exists(&hash).await.unwrap());
    }
}
