//! Asset upload use case.

mod upload_asset;

pub use upload_asset::{UploadAsset, UploadError, UploadStrategy};
