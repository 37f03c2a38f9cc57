//! Pinning capability: store bytes on IPFS and get a locator back.

use bytes::Bytes;

use crate::ids::ContentId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedContent {
    pub content_url: String,
    pub content_id: Option<ContentId>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinningError {
    #[error("pinning network error: {0}")]
    Network(String),
    #[error("pinning service error (status {status}): {message}")]
    Service { status: u16, message: String },
}

#[async_trait::async_trait]
pub trait PinningPort: Send + Sync {
    /// Pin `bytes` under `filename`. Exactly one request; no retry.
    async fn pin(&self, bytes: Bytes, filename: &str) -> Result<PinnedContent, PinningError>;
}
