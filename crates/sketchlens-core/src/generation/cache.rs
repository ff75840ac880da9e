//! Append-only directory of generated images served under the static prefix.

use crate::error::ProviderError;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Writes provider bytes to disk and hands back their public path.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Persist `data` and return `{url_prefix}/{filename}`.
    pub async fn store(&self, data: &[u8], extension: &str) -> Result<String, ProviderError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ProviderError::Cache(format!("{}: {e}", self.dir.display())))?;

        let name = unique_name(extension);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ProviderError::Cache(format!("{}: {e}", path.display())))?;

        tracing::debug!("Cached generated image at {:?} ({} bytes)", path, data.len());
        Ok(format!("{}/{}", self.url_prefix, name))
    }
}

/// `generated_{unix_millis}_{8 hex}.{ext}`; the random suffix separates writes
/// landing in the same millisecond.
fn unique_name(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen();
    let ext = extension.trim_start_matches('.');
    let ext = if ext.is_empty() { "png" } else { ext };
    format!("generated_{millis}_{suffix:08x}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("png");
        assert!(name.starts_with("generated_"));
        assert!(name.ends_with(".png"));
        let stem = name.trim_end_matches(".png");
        let suffix = stem.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unique_name_defaults_extension() {
        assert!(unique_name("").ends_with(".png"));
        assert!(unique_name(".jpg").ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path().join("static"), "/static/");

        let url = cache.store(b"fake image", "png").await.unwrap();
        assert!(url.starts_with("/static/generated_"));

        let file_name = url.trim_start_matches("/static/");
        let written = std::fs::read(dir.path().join("static").join(file_name)).unwrap();
        assert_eq!(written, b"fake image");
    }

    #[tokio::test]
    async fn test_rapid_writes_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path(), "/static");

        let mut urls = HashSet::new();
        for _ in 0..50 {
            urls.insert(cache.store(b"x", "png").await.unwrap());
        }
        assert_eq!(urls.len(), 50);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 50);
    }
}
