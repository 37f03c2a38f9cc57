use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

use pp_core::ids::TxHash;
use pp_core::passport::TxStatusUpdate;
use pp_core::ports::{ContractCall, LedgerError, LedgerWritePort, TxHandle};

use super::json_rpc::{parse_quantity, JsonRpcClient};

/// How receipts are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    /// Blocks including the one the transaction landed in.
    pub confirmations: u64,
    /// Without a final status after this long, the transaction is reported failed.
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            confirmations: 1,
            timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    status: Option<String>,
    block_number: Option<String>,
}

/// Ledger-write port over `eth_sendTransaction` and receipt polling.
///
/// Signing is left to the node or wallet behind the RPC endpoint.
pub struct EthereumLedger {
    rpc: Arc<JsonRpcClient>,
    policy: ReceiptPolicy,
}

impl EthereumLedger {
    pub fn new(rpc: Arc<JsonRpcClient>, policy: ReceiptPolicy) -> Self {
        Self { rpc, policy }
    }
}

#[async_trait::async_trait]
impl LedgerWritePort for EthereumLedger {
    async fn submit(&self, call: ContractCall) -> Result<TxHandle, LedgerError> {
        let tx = json!({
            "from": call.signer,
            "to": call.contract,
            "data": format!("0x{}", hex::encode(&call.calldata)),
        });
        let raw: String = self.rpc.call("eth_sendTransaction", json!([tx])).await?;
        let hash: TxHash = raw
            .parse()
            .map_err(|e| LedgerError::InvalidResponse(format!("eth_sendTransaction: {e}")))?;
        info!(function = %call.function_name(), %hash, "transaction accepted by node");
        Ok(TxHandle { hash })
    }

    async fn subscribe(
        &self,
        handle: &TxHandle,
    ) -> Result<mpsc::Receiver<TxStatusUpdate>, LedgerError> {
        let (tx, rx) = mpsc::channel(8);
        let rpc = self.rpc.clone();
        let policy = self.policy;
        let hash = handle.hash.clone();
        let span = info_span!("infra.ethereum_ledger.receipt_poll", hash = %hash);
        tokio::spawn(poll_receipt(rpc, policy, hash, tx).instrument(span));
        Ok(rx)
    }
}

async fn poll_receipt(
    rpc: Arc<JsonRpcClient>,
    policy: ReceiptPolicy,
    hash: TxHash,
    tx: mpsc::Sender<TxStatusUpdate>,
) {
    if tx.send(TxStatusUpdate::Pending).await.is_err() {
        return;
    }
    // A timeout too large to represent means no deadline.
    let deadline = Instant::now().checked_add(policy.timeout);
    let mut confirming_sent = false;

    loop {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!("no final status before timeout");
            let _ = tx
                .send(TxStatusUpdate::Failed {
                    reason: format!("not confirmed within {:?}", policy.timeout),
                })
                .await;
            return;
        }
        sleep(policy.poll_interval).await;

        let update = match check_receipt(&rpc, &hash, policy.confirmations).await {
            Ok(update) => update,
            Err(err) => {
                // A failed poll says nothing about the transaction; keep polling.
                warn!(error = %err, "receipt poll failed");
                continue;
            }
        };
        match update {
            Some(TxStatusUpdate::Confirming) | None => {
                if !confirming_sent {
                    confirming_sent = true;
                    if tx.send(TxStatusUpdate::Confirming).await.is_err() {
                        return;
                    }
                }
            }
            Some(terminal) => {
                debug!(?terminal, "final status");
                let _ = tx.send(terminal).await;
                return;
            }
        }
    }
}

/// `None` while no receipt exists yet.
async fn check_receipt(
    rpc: &JsonRpcClient,
    hash: &TxHash,
    confirmations: u64,
) -> Result<Option<TxStatusUpdate>, LedgerError> {
    let receipt: Option<Receipt> = rpc
        .call("eth_getTransactionReceipt", json!([hash.as_str()]))
        .await?;
    let Some(receipt) = receipt else {
        return Ok(None);
    };
    if receipt.status.as_deref() == Some("0x0") {
        return Ok(Some(TxStatusUpdate::Failed {
            reason: "reverted".to_string(),
        }));
    }
    let Some(included_in) = receipt.block_number.as_deref() else {
        return Ok(None);
    };
    let included_in = parse_quantity(included_in)?;
    if confirmations <= 1 {
        return Ok(Some(TxStatusUpdate::Confirmed { hash: hash.clone() }));
    }
    let latest: String = rpc.call("eth_blockNumber", json!([])).await?;
    let depth = parse_quantity(&latest)?.saturating_sub(included_in) + 1;
    if depth >= confirmations {
        Ok(Some(TxStatusUpdate::Confirmed { hash: hash.clone() }))
    } else {
        Ok(Some(TxStatusUpdate::Confirming))
    }
}
