//! Scratch space for in-flight renames.
//!
//! Every confirmed rename gets its own `<user_id>-<uuid>` subdirectory
//! under the scratch root, so concurrent confirmations can never collide
//! on a shared temp filename, whatever extension they carry. The whole
//! subdirectory is removed when the [`ScratchSpace`] is dropped, on every
//! exit path, including download and upload failures.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the file the original bytes are downloaded into, before the
/// extension is appended.
const INCOMING_STEM: &str = "incoming";

/// Root of the scratch area, created idempotently at startup.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
}

impl ScratchStore {
    /// Creates the scratch root if it does not exist yet.
    pub async fn init(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs_err::tokio::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocates a unique scratch directory for one in-flight rename.
    pub async fn begin(&self, user_id: i64, extension: &str) -> io::Result<ScratchSpace> {
        let dir = self.root.join(format!("{}-{}", user_id, Uuid::new_v4()));
        fs_err::tokio::create_dir_all(&dir).await?;

        let download_path = dir.join(format!("{}{}", INCOMING_STEM, extension));
        Ok(ScratchSpace { dir, download_path })
    }
}

/// One rename's private directory; removed recursively on drop.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: PathBuf,
    download_path: PathBuf,
}

impl ScratchSpace {
    /// Where the original file should be downloaded to.
    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// Renames the downloaded file to its final name within this
    /// directory and returns the resulting path.
    pub async fn rename_to(&self, new_name: &str) -> io::Result<PathBuf> {
        let final_path = self.dir.join(new_name);
        fs_err::tokio::rename(&self.download_path, &final_path).await?;
        Ok(final_path)
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Err(e) = fs_err::remove_dir_all(&self.dir) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to clean scratch dir {}: {}", self.dir.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("scratch");

        ScratchStore::init(&root).await.unwrap();
        let store = ScratchStore::init(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_begin_allocates_unique_paths_per_request() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScratchStore::init(tmp.path()).await.unwrap();

        let a = store.begin(1, ".txt").await.unwrap();
        let b = store.begin(1, ".txt").await.unwrap();

        // Same user, same extension, still disjoint directories.
        assert_ne!(a.download_path(), b.download_path());
        assert!(a.download_path().ends_with("incoming.txt"));
    }

    #[tokio::test]
    async fn test_rename_preserves_content() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScratchStore::init(tmp.path()).await.unwrap();

        let space = store.begin(5, ".pdf").await.unwrap();
        fs_err::tokio::write(space.download_path(), b"%PDF-1.4 payload").await.unwrap();

        let final_path = space.rename_to("final version.pdf").await.unwrap();
        assert_eq!(final_path.file_name().unwrap(), "final version.pdf");
        assert!(!space.download_path().exists());

        let bytes = fs_err::tokio::read(&final_path).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 payload");
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScratchStore::init(tmp.path()).await.unwrap();

        let dir = {
            let space = store.begin(9, ".bin").await.unwrap();
            fs_err::tokio::write(space.download_path(), b"data").await.unwrap();
            space.download_path().parent().unwrap().to_path_buf()
        };

        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_rename_missing_download_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScratchStore::init(tmp.path()).await.unwrap();

        let space = store.begin(3, ".txt").await.unwrap();
        let err = space.rename_to("nothing.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
