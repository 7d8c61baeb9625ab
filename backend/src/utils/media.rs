//! Image storage seam. The account and event paths only ever see the
//! stored reference string, never the backing provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

/// An image part pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Declared content type check; storage never inspects the bytes.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists the upload and returns its stored reference.
    async fn store(&self, upload: &UploadedImage) -> anyhow::Result<String>;
    /// Removes a previously stored reference. Unknown references are a no-op.
    async fn remove(&self, stored: &str) -> anyhow::Result<()>;
}

/// Writes uploads to a local directory, served statically under `/uploads`.
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, stored: &str) -> Option<PathBuf> {
        let name = stored.strip_prefix("uploads/")?;
        // Stored names are uuid-based; anything with a separator is not ours.
        if name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(&self, upload: &UploadedImage) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let extension = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::write(self.root.join(&name), &upload.bytes).await?;
        Ok(format!("uploads/{}", name))
    }

    async fn remove(&self, stored: &str) -> anyhow::Result<()> {
        if let Some(path) = self.file_path(stored) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

/// In-memory store used by the test suite.
pub struct MemoryMediaStore {
    stored: std::sync::Mutex<std::collections::HashMap<String, usize>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self {
            stored: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn contains(&self, stored: &str) -> bool {
        self.stored.lock().expect("media lock").contains_key(stored)
    }

    pub fn len(&self) -> usize {
        self.stored.lock().expect("media lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn store(&self, upload: &UploadedImage) -> anyhow::Result<String> {
        let stored = format!("uploads/{}", Uuid::new_v4());
        self.stored
            .lock()
            .expect("media lock")
            .insert(stored.clone(), upload.bytes.len());
        Ok(stored)
    }

    async fn remove(&self, stored: &str) -> anyhow::Result<()> {
        self.stored.lock().expect("media lock").remove(stored);
        Ok(())
    }
}
