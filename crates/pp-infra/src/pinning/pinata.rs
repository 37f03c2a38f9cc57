use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use pp_core::ids::ContentId;
use pp_core::ports::{PinnedContent, PinningError, PinningPort};

use super::truncate_body;

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata `pinFileToIPFS` client authenticated with a JWT.
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    jwt: String,
    gateway_url: String,
}

impl PinataClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        jwt: impl Into<String>,
        gateway_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            jwt: jwt.into(),
            gateway_url: gateway_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn content_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }
}

#[async_trait::async_trait]
impl PinningPort for PinataClient {
    async fn pin(&self, bytes: Bytes, filename: &str) -> Result<PinnedContent, PinningError> {
        let size = bytes.len();
        let part = Part::stream_with_length(bytes, size as u64).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinningError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = truncate_body(response.text().await.unwrap_or_default());
            warn!(status = status.as_u16(), %message, "pinata rejected upload");
            return Err(PinningError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: PinFileResponse = response.json().await.map_err(|e| PinningError::Service {
            status: status.as_u16(),
            message: format!("unexpected response body: {e}"),
        })?;
        debug!(cid = %body.ipfs_hash, size, "pinned file");

        Ok(PinnedContent {
            content_url: self.content_url(&body.ipfs_hash),
            content_id: Some(ContentId::from_string(body.ipfs_hash)),
        })
    }
}
