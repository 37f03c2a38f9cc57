use serde::{Deserialize, Serialize};

use super::{Asset, AssetSource};

/// 2 MiB, the profile photo ceiling.
pub const DEFAULT_MAX_PROFILE_PHOTO_BYTES: u64 = 2 * 1024 * 1024;

/// Ceiling announced to the upload broker when requesting a direct-upload target.
pub const DEFAULT_MAX_DIRECT_UPLOAD_MB: u64 = 50;

/// Synchronous reasons an asset is refused before any upload starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AssetRejection {
    #[error("asset is empty")]
    Empty,
    #[error("asset is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Intake limits applied before an asset reaches the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPolicy {
    pub max_profile_photo_bytes: u64,
    pub max_direct_upload_mb: u64,
}

impl Default for AssetPolicy {
    fn default() -> Self {
        Self {
            max_profile_photo_bytes: DEFAULT_MAX_PROFILE_PHOTO_BYTES,
            max_direct_upload_mb: DEFAULT_MAX_DIRECT_UPLOAD_MB,
        }
    }
}

impl AssetPolicy {
    /// Checks an asset against the intake limits.
    ///
    /// Only the profile photo path carries a size ceiling; file picks and
    /// snapshots are limited by the pinning service itself.
    pub fn check(&self, asset: &Asset) -> Result<(), AssetRejection> {
        if asset.is_empty() {
            return Err(AssetRejection::Empty);
        }
        let size = asset.len() as u64;
        if asset.source == AssetSource::ProfilePhoto && size > self.max_profile_photo_bytes {
            return Err(AssetRejection::TooLarge {
                size,
                limit: self.max_profile_photo_bytes,
            });
        }
        Ok(())
    }

    pub fn max_direct_upload_bytes(&self) -> u64 {
        self.max_direct_upload_mb.saturating_mul(1024 * 1024)
    }
}
