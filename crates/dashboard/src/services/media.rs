//! Uploaded image storage.
//!
//! Product gallery images live under `<shop_id>/<product_id>/<uuid>.<ext>` and
//! theme assets under `<shop_id>/theme/<kind>-<uuid>.<ext>`, relative to the
//! media root. Public URLs are the configured media base URL plus the key.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use converty_core::{ProductId, ShopId};

use crate::config::MediaConfig;

/// Errors from validating or storing an upload.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file is not an image.
    #[error("{0} is not an image")]
    NotAnImage(String),

    /// The file exceeds the upload limit.
    #[error("{name} is larger than {limit_mib} MiB")]
    TooLarge { name: String, limit_mib: usize },

    /// Empty file part.
    #[error("{0} is empty")]
    Empty(String),

    /// Key escapes the media root or is otherwise malformed.
    #[error("invalid media key: {0}")]
    InvalidKey(String),

    #[error("media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded file that passed validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check content type and size.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` for non-image, empty or oversized files.
    pub fn validate(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, MediaError> {
        let file_name = file_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

        if !content_type.starts_with("image/") {
            return Err(MediaError::NotAnImage(file_name));
        }
        if bytes.is_empty() {
            return Err(MediaError::Empty(file_name));
        }
        if bytes.len() > max_bytes {
            return Err(MediaError::TooLarge {
                name: file_name,
                limit_mib: max_bytes / (1024 * 1024),
            });
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// File extension from the file name, falling back to the content type.
    #[must_use]
    pub fn extension(&self) -> String {
        let from_name = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()));
        if let Some(ext) = from_name {
            return ext.to_ascii_lowercase();
        }

        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/avif" => "avif",
            "image/svg+xml" => "svg",
            _ => "img",
        }
        .to_string()
    }
}

/// Storage key for a product gallery image.
#[must_use]
pub fn product_image_key(shop_id: ShopId, product_id: ProductId, extension: &str) -> String {
    format!("{shop_id}/{product_id}/{}.{extension}", Uuid::new_v4())
}

/// Storage key prefix holding all images of one product.
#[must_use]
pub fn product_prefix(shop_id: ShopId, product_id: ProductId) -> String {
    format!("{shop_id}/{product_id}")
}

/// Storage key for a theme asset such as `logo` or `banner`.
#[must_use]
pub fn theme_asset_key(shop_id: ShopId, kind: &str, extension: &str) -> String {
    format!("{shop_id}/theme/{kind}-{}.{extension}", Uuid::new_v4())
}

/// Blob storage for uploaded media.
pub trait MediaStore: Send + Sync {
    /// Store bytes under `key`, replacing anything already there.
    fn put(&self, key: &str, bytes: &[u8]) -> impl Future<Output = Result<(), MediaError>> + Send;

    /// Public URL the stored object is served from.
    fn public_url(&self, key: &str) -> String;

    /// Remove every object whose key starts with `prefix`. Missing prefixes are not an error.
    fn delete_prefix(&self, prefix: &str) -> impl Future<Output = Result<(), MediaError>> + Send;

    /// Remove a single object. Missing objects are not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), MediaError>> + Send;
}

/// Media store backed by a local directory served as static files.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: config.dir.clone(),
            base_url: config.base_url.clone(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` under the root, rejecting absolute paths and `..`.
    fn resolve(&self, key: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(MediaError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl MediaStore for LocalMediaStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key, size = bytes.len(), "Stored media object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), MediaError> {
        let path = self.resolve(prefix)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), MediaError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn store(dir: &Path) -> LocalMediaStore {
        LocalMediaStore::new(&MediaConfig {
            dir: dir.to_path_buf(),
            base_url: "/media".to_string(),
            max_upload_bytes: 5 * MIB,
        })
    }

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("converty-media-{name}-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_validate_accepts_images() {
        let upload =
            ImageUpload::validate(Some("photo.JPG"), Some("image/jpeg"), vec![1, 2, 3], MIB)
                .unwrap();
        assert_eq!(upload.extension(), "jpg");
    }

    #[test]
    fn test_validate_rejects_non_images_and_oversize() {
        assert!(matches!(
            ImageUpload::validate(Some("notes.txt"), Some("text/plain"), vec![1], MIB),
            Err(MediaError::NotAnImage(_))
        ));
        assert!(matches!(
            ImageUpload::validate(Some("big.png"), Some("image/png"), vec![0; MIB + 1], MIB),
            Err(MediaError::TooLarge { limit_mib: 1, .. })
        ));
        assert!(matches!(
            ImageUpload::validate(Some("empty.png"), Some("image/png"), Vec::new(), MIB),
            Err(MediaError::Empty(_))
        ));
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        let upload =
            ImageUpload::validate(Some("logo"), Some("image/png"), vec![1], MIB).unwrap();
        assert_eq!(upload.extension(), "png");

        let upload =
            ImageUpload::validate(None, Some("image/x-unknown"), vec![1], MIB).unwrap();
        assert_eq!(upload.extension(), "img");
    }

    #[test]
    fn test_keys_are_scoped_by_shop() {
        let shop = ShopId::generate();
        let product = ProductId::generate();

        let key = product_image_key(shop, product, "png");
        assert!(key.starts_with(&product_prefix(shop, product)));
        assert!(key.ends_with(".png"));

        let logo = theme_asset_key(shop, "logo", "svg");
        assert!(logo.starts_with(&format!("{shop}/theme/logo-")));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = store(Path::new("/tmp/media"));
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("").is_err());
        assert_eq!(
            store.resolve("a/b.png").unwrap(),
            PathBuf::from("/tmp/media/a/b.png")
        );
    }

    #[test]
    fn test_public_url() {
        let store = store(Path::new("media"));
        assert_eq!(store.public_url("s/p/x.png"), "/media/s/p/x.png");
    }

    #[tokio::test]
    async fn test_put_and_delete_prefix() {
        let root = temp_root("prefix");
        let store = store(&root);
        let shop = ShopId::generate();
        let product = ProductId::generate();
        let key = product_image_key(shop, product, "png");

        store.put(&key, b"png-bytes").await.unwrap();
        assert_eq!(tokio::fs::read(root.join(&key)).await.unwrap(), b"png-bytes");

        store.delete_prefix(&product_prefix(shop, product)).await.unwrap();
        assert!(!root.join(&key).exists());

        // Deleting again is a no-op.
        store.delete_prefix(&product_prefix(shop, product)).await.unwrap();
        store.delete(&key).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
