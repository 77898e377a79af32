use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{ChatError, Result};

/// File-backed blob bucket. Objects live at `<root>/<folder>/<name>` and are
/// retrieved through `file://` URLs.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Copy `source` into `folder` under its original file name and return
    /// the public URL of the stored object. An existing object with the same
    /// name is overwritten.
    pub async fn upload(&self, folder: &str, source: &Path) -> Result<String> {
        let name = source
            .file_name()
            .ok_or_else(|| ChatError::InvalidUpload {
                path: source.to_path_buf(),
                reason: "path has no file name".to_string(),
            })?
            .to_owned();

        let metadata = tokio::fs::metadata(source).await?;
        if !metadata.is_file() {
            return Err(ChatError::InvalidUpload {
                path: source.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(name);
        let bytes = tokio::fs::copy(source, &target).await?;
        log::debug!("Stored {bytes} bytes at {}", target.display());

        let absolute = tokio::fs::canonicalize(&target).await?;
        Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .map_err(|()| ChatError::InvalidUpload {
                path: absolute,
                reason: "cannot express path as a URL".to_string(),
            })
    }
}

/// Local path behind a `file://` download URL.
pub fn resolve_download_url(url: &str) -> Option<PathBuf> {
    Url::parse(url).ok()?.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_copies_file_and_returns_resolvable_url() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cat.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let store = BlobStore::new(dir.path().join("blobs"));
        let url = store.upload("Photos", &source).await.unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/Photos/cat.jpg"));
        let stored = resolve_download_url(&url).unwrap();
        assert_eq!(std::fs::read(stored).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn same_name_upload_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a");
        let second = dir.path().join("b");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("photo.jpg"), b"one").unwrap();
        std::fs::write(second.join("photo.jpg"), b"two").unwrap();

        let store = BlobStore::new(dir.path().join("blobs"));
        let url_one = store.upload("Photos", &first.join("photo.jpg")).await.unwrap();
        let url_two = store.upload("Photos", &second.join("photo.jpg")).await.unwrap();

        assert_eq!(url_one, url_two);
        let stored = resolve_download_url(&url_two).unwrap();
        assert_eq!(std::fs::read(stored).unwrap(), b"two");
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().join("blobs"));
        let result = store.upload("Photos", &dir.path().join("nope.jpg")).await;
        assert!(matches!(result, Err(ChatError::Io(_))));
    }

    #[tokio::test]
    async fn directory_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().join("blobs"));
        let result = store.upload("Photos", dir.path()).await;
        assert!(matches!(result, Err(ChatError::InvalidUpload { .. })));
    }

    #[test]
    fn non_file_urls_do_not_resolve() {
        assert!(resolve_download_url("https://example.com/a.jpg").is_none());
        assert!(resolve_download_url("not a url").is_none());
    }
}
