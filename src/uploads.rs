//! Picture upload boundary. Storage, size and type checks belong to the
//! implementation; microposts only keep the returned reference.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait PictureStore: Send + Sync {
    /// Persists the payload and returns a stable reference (path or URL).
    async fn store(&self, upload: PictureUpload) -> Result<String>;
}
