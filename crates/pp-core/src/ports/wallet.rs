//! Wallet session capability. The flow only reads the session; connecting and
//! disconnecting are exposed for the shell.

use serde::{Deserialize, Serialize};

use crate::ids::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletSession {
    pub account: Option<Address>,
    pub is_connected: bool,
}

impl WalletSession {
    pub fn connected(account: Address) -> Self {
        Self {
            account: Some(account),
            is_connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The account usable for signing, if any.
    pub fn active_account(&self) -> Option<Address> {
        if self.is_connected {
            self.account
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
    #[error("wallet has no accounts")]
    NoAccounts,
}

#[async_trait::async_trait]
pub trait WalletSessionPort: Send + Sync {
    async fn session(&self) -> WalletSession;
    async fn connect(&self) -> Result<WalletSession, WalletError>;
    async fn disconnect(&self) -> Result<(), WalletError>;
}
