//! Binary assets handed to the uploader.

mod policy;

pub use policy::{AssetPolicy, AssetRejection, DEFAULT_MAX_DIRECT_UPLOAD_MB, DEFAULT_MAX_PROFILE_PHOTO_BYTES};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Where an asset came from.
///
/// 资源来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetSource {
    /// Raw file picked by the user.
    FilePick,
    /// Profile photo intake (size-limited).
    ProfilePhoto,
    /// Raster snapshot of the rendered passport card.
    Snapshot,
}

/// A local binary asset waiting to be pinned.
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Bytes,
    pub filename: String,
    pub mime_type: Option<String>,
    pub source: AssetSource,
}

impl Asset {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>, source: AssetSource) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type: None,
            source,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads can be megabytes; log the size only.
impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("len", &self.bytes.len())
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("source", &self.source)
            .finish()
    }
}
