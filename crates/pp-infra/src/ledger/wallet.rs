use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use pp_core::ids::Address;
use pp_core::ports::{LedgerError, WalletError, WalletSession, WalletSessionPort};

use super::json_rpc::JsonRpcClient;

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

/// Wallet session backed by the accounts the RPC endpoint manages.
pub struct RpcWalletSession {
    rpc: Arc<JsonRpcClient>,
    /// Account to select when the endpoint manages several.
    preferred: Option<Address>,
    session: Mutex<WalletSession>,
}

impl RpcWalletSession {
    pub fn new(rpc: Arc<JsonRpcClient>, preferred: Option<Address>) -> Self {
        Self {
            rpc,
            preferred,
            session: Mutex::new(WalletSession::disconnected()),
        }
    }

    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        match self.rpc.call("eth_requestAccounts", json!([])).await {
            Ok(accounts) => Ok(accounts),
            Err(LedgerError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => self
                .rpc
                .call("eth_accounts", json!([]))
                .await
                .map_err(|e| WalletError::Unavailable(e.to_string())),
            Err(e) => Err(WalletError::Unavailable(e.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl WalletSessionPort for RpcWalletSession {
    async fn session(&self) -> WalletSession {
        *self.session.lock().await
    }

    async fn connect(&self) -> Result<WalletSession, WalletError> {
        let accounts: Vec<Address> = self
            .accounts()
            .await?
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(address) => Some(address),
                Err(err) => {
                    warn!(%raw, error = %err, "ignoring malformed account");
                    None
                }
            })
            .collect();

        let account = match self.preferred {
            Some(preferred) => accounts.into_iter().find(|a| *a == preferred),
            None => accounts.into_iter().next(),
        }
        .ok_or(WalletError::NoAccounts)?;

        let session = WalletSession::connected(account);
        *self.session.lock().await = session;
        info!(account = %account, "wallet connected");
        Ok(session)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.session.lock().await = WalletSession::disconnected();
        info!("wallet disconnected");
        Ok(())
    }
}
