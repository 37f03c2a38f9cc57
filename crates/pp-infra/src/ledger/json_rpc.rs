use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::trace;

use pp_core::ports::LedgerError;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

/// JSON-RPC 2.0 over HTTP.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(%method, id, "json-rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!(
                "{method}: HTTP {}",
                status.as_u16()
            )));
        }
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))?;
        if let Some(error) = body.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        serde_json::from_value(body.result)
            .map_err(|e| LedgerError::InvalidResponse(format!("{method}: {e}")))
    }
}

/// Parse a hex quantity such as `0x1b4`.
pub fn parse_quantity(value: &str) -> Result<u64, LedgerError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::InvalidResponse(format!("not a hex quantity: {value}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|_| LedgerError::InvalidResponse(format!("not a hex quantity: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_accepts_hex() {
        assert_eq!(parse_quantity("0x1b4").unwrap(), 436);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert!(parse_quantity("12").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[tokio::test]
    async fn rpc_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected"}}"#)
            .create_async()
            .await;
        let client = JsonRpcClient::new(reqwest::Client::new(), server.url());

        let err = client
            .call::<String>("eth_sendTransaction", json!([]))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err,
            LedgerError::Rpc {
                code: 4001,
                message: "User rejected".into()
            }
        );
    }
}
