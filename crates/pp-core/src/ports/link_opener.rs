use anyhow::Result;

/// Opens an external link (explorer page, gateway URL) for the user.
#[async_trait::async_trait]
pub trait LinkOpenerPort: Send + Sync {
    async fn open_link(&self, url: &str) -> Result<()>;
}
