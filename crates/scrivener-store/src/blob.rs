//! Filesystem-backed blob store
//!
//! Stores original and completed document files under a root directory,
//! one subdirectory per logical bucket:
//!
//! ```text
//! <root>/original/<document_id>/original.docx
//! <root>/completed/<document_id>/completed.docx
//! ```

use crate::StoreError;
use scrivener_domain::traits::{BlobStore, Bucket};
use std::fs;
use std::path::{Path, PathBuf};

/// Blob store over a local directory tree
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a blob store rooted at the given directory
    ///
    /// The directory (and bucket subdirectories) are created on demand.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, bucket: Bucket, key: &str) -> PathBuf {
        self.root.join(bucket.as_str()).join(key)
    }
}

impl BlobStore for FsBlobStore {
    type Error = StoreError;

    fn put_blob(&mut self, bucket: Bucket, key: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        let path = self.blob_path(bucket, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn get_blob(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, Self::Error> {
        let path = self.blob_path(bucket, key);
        if !path.exists() {
            return Err(StoreError::NotFound(format!(
                "blob {}/{}",
                bucket.as_str(),
                key
            )));
        }
        Ok(fs::read(path)?)
    }
}
