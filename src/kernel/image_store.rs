//! Local-disk photo storage.
//!
//! Uploads land under the configured directory with a fresh UUID name; the
//! returned URL is served by the static file route.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::common::UploadId;
use crate::kernel::traits::BaseImageStore;

pub struct LocalImageStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BaseImageStore for LocalImageStore {
    async fn store(&self, extension: &str, bytes: Vec<u8>) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating upload dir {}", self.dir.display()))?;

        let name = format!("{}.{}", UploadId::new(), extension);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;

        Ok(format!(
            "{}/uploads/{}",
            self.base_url.trim_end_matches('/'),
            name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::traits::BaseImageStore;

    #[tokio::test]
    async fn test_store_writes_file_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("npr-uploads-{}", uuid::Uuid::new_v4()));
        let store = LocalImageStore::new(&dir, "http://localhost:8080");

        let url = store.store("jpg", vec![0xFF, 0xD8]).await.unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/"));
        assert!(url.ends_with(".jpg"));

        let name = url.rsplit('/').next().unwrap();
        let stem = name.strip_suffix(".jpg").unwrap();
        assert_eq!(UploadId::parse(stem).unwrap().into_uuid().get_version_num(), 4);

        let on_disk = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(on_disk, vec![0xFF, 0xD8]);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
