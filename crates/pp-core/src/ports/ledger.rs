//! Ledger-write capability: submit a contract call and follow its status.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ids::{Address, TxHash};
use crate::passport::TxStatusUpdate;

/// A state-changing contract call signed by `signer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: Address,
    /// Canonical signature, e.g. `safeMint(address,string)`.
    pub function: String,
    /// ABI-encoded calldata, selector included.
    pub calldata: Bytes,
    pub signer: Address,
}

impl ContractCall {
    /// Function name without the parameter list.
    pub fn function_name(&self) -> &str {
        self.function
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(&self.function)
    }
}

/// Returned once the ledger accepted the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(String),
    #[error("ledger rejected the request ({code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected ledger response: {0}")]
    InvalidResponse(String),
}

#[async_trait::async_trait]
pub trait LedgerWritePort: Send + Sync {
    async fn submit(&self, call: ContractCall) -> Result<TxHandle, LedgerError>;

    /// Status stream for a submitted transaction. Ends after a terminal update.
    async fn subscribe(
        &self,
        handle: &TxHandle,
    ) -> Result<mpsc::Receiver<TxStatusUpdate>, LedgerError>;
}
