//! Ethereum ledger adapters over JSON-RPC.

mod ethereum;
mod json_rpc;
mod wallet;

pub use ethereum::{EthereumLedger, ReceiptPolicy};
pub use json_rpc::{parse_quantity, JsonRpcClient};
pub use wallet::RpcWalletSession;
