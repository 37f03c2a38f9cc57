use bytes::Bytes;
use futures::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use pp_core::ids::ContentId;
use pp_core::ports::{BrokerError, UploadBrokerPort, UploadProgress, UploadTarget};

use super::truncate_body;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
    name: &'a str,
    #[serde(rename = "maxSizeInMB")]
    max_size_in_mb: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
    cid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayUrlResponse {
    gateway_url: String,
}

/// Client for the upload broker backend:
/// `POST /api/pinata/upload-url`, `PUT <uploadUrl>`, `GET /api/pinata/gateway-url/<cid>`.
pub struct HttpUploadBroker {
    http: reqwest::Client,
    base_url: String,
    chunk_size: usize,
}

impl HttpUploadBroker {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BrokerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = truncate_body(response.text().await.unwrap_or_default());
        Err(BrokerError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

fn network(err: reqwest::Error) -> BrokerError {
    BrokerError::Network(err.to_string())
}

fn invalid(err: reqwest::Error) -> BrokerError {
    BrokerError::InvalidResponse(err.to_string())
}

#[async_trait::async_trait]
impl UploadBrokerPort for HttpUploadBroker {
    async fn request_upload_target(
        &self,
        filename: &str,
        max_size_mb: u64,
    ) -> Result<UploadTarget, BrokerError> {
        let response = self
            .http
            .post(format!("{}/api/pinata/upload-url", self.base_url))
            .json(&UploadUrlRequest {
                name: filename,
                max_size_in_mb: max_size_mb,
            })
            .send()
            .await
            .map_err(network)?;
        let body: UploadUrlResponse = Self::check(response).await?.json().await.map_err(invalid)?;
        debug!(cid = %body.cid, "received upload target");
        Ok(UploadTarget {
            upload_url: body.upload_url,
            content_id: ContentId::from_string(body.cid),
        })
    }

    async fn transfer(
        &self,
        target: &UploadTarget,
        bytes: Bytes,
        progress: mpsc::Sender<UploadProgress>,
    ) -> Result<(), BrokerError> {
        let total = bytes.len() as u64;
        let chunk_size = self.chunk_size;
        // Progress is reported as each chunk is handed to the connection.
        let chunks = stream::unfold((bytes, 0usize, progress), move |(bytes, offset, progress)| async move {
            if offset >= bytes.len() {
                return None;
            }
            let end = (offset + chunk_size).min(bytes.len());
            let chunk = bytes.slice(offset..end);
            let _ = progress
                .send(UploadProgress {
                    transferred: end as u64,
                    total,
                })
                .await;
            Some((Ok::<Bytes, std::io::Error>(chunk), (bytes, end, progress)))
        });

        let response = self
            .http
            .put(&target.upload_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(chunks))
            .send()
            .await
            .map_err(network)?;
        Self::check(response).await?;
        debug!(total, cid = %target.content_id, "transfer complete");
        Ok(())
    }

    async fn resolve_gateway_url(&self, content_id: &ContentId) -> Result<String, BrokerError> {
        let response = self
            .http
            .get(format!("{}/api/pinata/gateway-url/{}", self.base_url, content_id))
            .send()
            .await
            .map_err(network)?;
        let body: GatewayUrlResponse = Self::check(response).await?.json().await.map_err(invalid)?;
        Ok(body.gateway_url)
    }
}
