//! On-disk download storage.
//!
//! Serves previously saved files back to clients. Filenames come from
//! the client, so resolution is strict: no path separators, no
//! traversal, nothing outside the downloads directory.

use std::path::{Path, PathBuf};

use tokio::fs;

/// Errors from download storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid filename: {name}")]
    InvalidFilename { name: String },

    #[error("file not found: {name}")]
    NotFound { name: String },

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// An opened stored file with the metadata needed for response headers.
#[derive(Debug)]
pub struct StoredFile {
    pub file: fs::File,
    pub len: u64,
    pub content_type: String,
    pub filename: String,
}

/// Resolves client-supplied filenames inside the downloads directory.
#[derive(Debug, Clone)]
pub struct DownloadStore {
    root: PathBuf,
}

impl DownloadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the downloads directory if missing.
    ///
    /// # Errors
    /// - `StorageError::Io` - Directory creation failed
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Opens a stored file by its bare filename.
    ///
    /// # Errors
    /// - `StorageError::InvalidFilename` - Empty, contains separators, or traverses
    /// - `StorageError::NotFound` - No such file in the downloads directory
    /// - `StorageError::Io` - Open or metadata read failed
    pub async fn open(&self, filename: &str) -> Result<StoredFile, StorageError> {
        if !is_safe_filename(filename) {
            return Err(StorageError::InvalidFilename {
                name: filename.to_string(),
            });
        }

        let path = self.root.join(filename);
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    name: filename.to_string(),
                });
            }
            Err(error) => return Err(error.into()),
        };

        let len = file.metadata().await?.len();
        let content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string();

        Ok(StoredFile {
            file,
            len,
            content_type,
            filename: filename.to_string(),
        })
    }
}

/// A filename is safe when it is non-empty, names no parent, and
/// contains no path separators.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains('/')
        && !filename.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_and_separators_are_rejected() {
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b.mp4"));
        assert!(!is_safe_filename(r"a\b.mp4"));
        assert!(is_safe_filename("video.mp4"));
        assert!(is_safe_filename("My Title 1080p.mp4"));
    }

    #[tokio::test]
    async fn open_serves_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DownloadStore::new(dir.path());
        tokio::fs::write(dir.path().join("clip.mp4"), b"mp4 bytes")
            .await
            .unwrap();

        let stored = store.open("clip.mp4").await.unwrap();
        assert_eq!(stored.len, 9);
        assert_eq!(stored.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn open_distinguishes_missing_from_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = DownloadStore::new(dir.path());

        assert!(matches!(
            store.open("missing.mp4").await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.open("../escape.mp4").await,
            Err(StorageError::InvalidFilename { .. })
        ));
    }
}
