//! Snapshot capability: render the passport card to a raster image.

use bytes::Bytes;

use crate::asset::Asset;
use crate::ids::Address;

/// Everything the card shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassportCardView {
    /// Full name, e.g. `alice.crefy.eth`.
    pub display_name: Option<String>,
    pub owner: Option<Address>,
    /// Encoded profile photo (PNG/JPEG).
    pub photo: Option<Bytes>,
}

impl PassportCardView {
    /// `<name>-passport.png`, or `crefy-passport.png` before a name is chosen.
    pub fn download_filename(&self) -> String {
        let stem = self
            .display_name
            .as_deref()
            .and_then(|n| n.split('.').next())
            .filter(|n| !n.is_empty())
            .unwrap_or("crefy");
        format!("{stem}-passport.png")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid scale factor {0}")]
    InvalidScale(String),
    #[error("could not decode profile photo: {0}")]
    Photo(String),
    #[error("render failed: {0}")]
    Render(String),
}

#[async_trait::async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Render `view` at `scale` times the base card size, as a PNG asset.
    async fn render(&self, view: &PassportCardView, scale: f32) -> Result<Asset, SnapshotError>;
}
