//! Content-addressed archive for escritura PDFs.
//!
//! Uploaded deed PDFs are stored by SHA-256 hash; the escritura row keeps
//! the hash, so re-uploading an identical file is free and renames never
//! invalidate stored content.

mod error;
mod hash;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use hash::ContentHash;
pub use traits::{BoxReader, PdfStore};
