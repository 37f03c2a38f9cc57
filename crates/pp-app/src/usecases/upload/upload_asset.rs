use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};

use pp_core::asset::Asset;
use pp_core::passport::UploadResult;
use pp_core::ports::{
    BrokerError, PassportEventPort, PinningError, PinningPort, UploadBrokerPort, UploadProgress,
};

/// How an asset reaches IPFS.
#[derive(Clone)]
pub enum UploadStrategy {
    /// One `pinFileToIPFS`-style call.
    Pin(Arc<dyn PinningPort>),
    /// Upload target, byte transfer with progress, gateway lookup.
    Broker {
        broker: Arc<dyn UploadBrokerPort>,
        max_direct_upload_mb: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Pinning(#[from] PinningError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("file is {size} bytes, direct uploads are limited to {limit_mb} MB")]
    TooLarge { size: u64, limit_mb: u64 },
}

/// Upload one asset. A single attempt; failures are returned, never retried.
pub struct UploadAsset {
    strategy: UploadStrategy,
    events: Arc<dyn PassportEventPort>,
}

impl UploadAsset {
    pub fn new(strategy: UploadStrategy, events: Arc<dyn PassportEventPort>) -> Self {
        Self { strategy, events }
    }

    pub async fn execute(&self, asset: &Asset) -> Result<UploadResult, UploadError> {
        let span = info_span!(
            "usecase.upload_asset.execute",
            filename = %asset.filename,
            size = asset.len()
        );
        async {
            let result = match &self.strategy {
                UploadStrategy::Pin(pinning) => {
                    let pinned = pinning.pin(asset.bytes.clone(), &asset.filename).await?;
                    UploadResult {
                        content_url: pinned.content_url,
                        content_id: pinned.content_id,
                    }
                }
                UploadStrategy::Broker {
                    broker,
                    max_direct_upload_mb,
                } => self.upload_via_broker(broker.as_ref(), *max_direct_upload_mb, asset).await?,
            };
            info!(content_url = %result.content_url, "asset uploaded");
            Ok(result)
        }
        .instrument(span)
        .await
    }

    async fn upload_via_broker(
        &self,
        broker: &dyn UploadBrokerPort,
        max_direct_upload_mb: u64,
        asset: &Asset,
    ) -> Result<UploadResult, UploadError> {
        let size = asset.len() as u64;
        if size > max_direct_upload_mb.saturating_mul(1024 * 1024) {
            return Err(UploadError::TooLarge {
                size,
                limit_mb: max_direct_upload_mb,
            });
        }

        let target = broker
            .request_upload_target(&asset.filename, max_direct_upload_mb)
            .await?;

        let (progress_tx, mut progress_rx) = mpsc::channel::<UploadProgress>(16);
        let forward_progress = async {
            while let Some(progress) = progress_rx.recv().await {
                self.events.emit_upload_progress(progress).await;
            }
        };
        let (transferred, ()) = tokio::join!(
            broker.transfer(&target, asset.bytes.clone(), progress_tx),
            forward_progress
        );
        transferred?;

        let content_url = broker.resolve_gateway_url(&target.content_id).await?;
        Ok(UploadResult {
            content_url,
            content_id: Some(target.content_id),
        })
    }
}
