//! Direct-upload broker: a backend that hands out a pre-signed upload URL,
//! accepts the bytes there, and resolves the gateway URL afterwards.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ids::ContentId;

/// Where to send the bytes and the content id they will be pinned under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub upload_url: String,
    pub content_id: ContentId,
}

/// Byte-level transfer progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub transferred: u64,
    pub total: u64,
}

impl UploadProgress {
    /// Rounded percentage, 0 when the total is unknown.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.transferred.min(self.total) * 100 + self.total / 2) / self.total;
        pct as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("broker network error: {0}")]
    Network(String),
    #[error("broker service error (status {status}): {message}")]
    Service { status: u16, message: String },
    #[error("broker returned an unexpected response: {0}")]
    InvalidResponse(String),
}

#[async_trait::async_trait]
pub trait UploadBrokerPort: Send + Sync {
    async fn request_upload_target(
        &self,
        filename: &str,
        max_size_mb: u64,
    ) -> Result<UploadTarget, BrokerError>;

    /// Send `bytes` to the target, reporting progress as chunks go out.
    async fn transfer(
        &self,
        target: &UploadTarget,
        bytes: Bytes,
        progress: mpsc::Sender<UploadProgress>,
    ) -> Result<(), BrokerError>;

    async fn resolve_gateway_url(&self, content_id: &ContentId) -> Result<String, BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_and_clamps() {
        let p = |transferred, total| UploadProgress { transferred, total }.percent();
        assert_eq!(p(0, 0), 0);
        assert_eq!(p(1, 3), 33);
        assert_eq!(p(2, 3), 67);
        assert_eq!(p(10, 3), 100);
    }
}
