use tokio::sync::mpsc;

use pp_core::passport::TxStatusUpdate;
use pp_core::ports::{ContractCall, LedgerError, LedgerWritePort, TxHandle};

/// A transaction the ledger accepted, with its status stream.
#[derive(Debug)]
pub struct SubmittedTx {
    pub handle: TxHandle,
    pub updates: mpsc::Receiver<TxStatusUpdate>,
}

pub(crate) async fn submit_and_follow(
    ledger: &dyn LedgerWritePort,
    call: ContractCall,
) -> Result<SubmittedTx, LedgerError> {
    let function = call.function_name().to_string();
    let handle = ledger.submit(call).await?;
    tracing::info!(function = %function, hash = %handle.hash, "transaction submitted");
    let updates = ledger.subscribe(&handle).await?;
    Ok(SubmittedTx { handle, updates })
}
