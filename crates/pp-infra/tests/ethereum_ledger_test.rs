use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::keccak256;
use bytes::Bytes;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use pp_core::ids::{Address, TxHash};
use pp_core::passport::TxStatusUpdate;
use pp_core::ports::{
    ContractCall, LedgerError, LedgerWritePort, TxHandle, WalletError, WalletSessionPort,
};
use pp_infra::ledger::ReceiptPolicy;
use pp_infra::{EthereumLedger, JsonRpcClient, RpcWalletSession};

const OWNER: &str = "0x00000000000000000000000000000000000000aa";

fn hash() -> TxHash {
    format!("0x{}", "ab".repeat(32)).parse().unwrap()
}

fn rpc(server: &ServerGuard) -> Arc<JsonRpcClient> {
    Arc::new(JsonRpcClient::new(reqwest::Client::new(), server.url()))
}

fn fast_policy(confirmations: u64) -> ReceiptPolicy {
    ReceiptPolicy {
        poll_interval: Duration::from_millis(20),
        confirmations,
        timeout: Duration::from_millis(300),
    }
}

fn rpc_result(value: serde_json::Value) -> String {
    json!({"jsonrpc": "2.0", "id": 1, "result": value}).to_string()
}

async fn mock_method(server: &mut ServerGuard, method: &str, result: serde_json::Value) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": method})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(result))
        .create_async()
        .await
}

async fn collect(ledger: &EthereumLedger) -> Vec<TxStatusUpdate> {
    let mut rx = ledger.subscribe(&TxHandle { hash: hash() }).await.unwrap();
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn ethereum_ledger_submit_sends_calldata_as_hex() {
    let mut server = Server::new_async().await;
    let digest = keccak256("safeMint(address,string)");
    let mut calldata = digest[..4].to_vec();
    calldata.extend_from_slice(&[0u8; 32]);
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"method": "eth_sendTransaction"})),
            Matcher::Regex(format!("\"data\":\"0x{}\"", hex::encode(&calldata))),
            Matcher::Regex(format!("(?i)\"from\":\"{OWNER}\"")),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!(hash().as_str())))
        .create_async()
        .await;
    let ledger = EthereumLedger::new(rpc(&server), fast_policy(1));
    let owner: Address = OWNER.parse().unwrap();

    let handle = ledger
        .submit(ContractCall {
            contract: "0x00000000000000000000000000000000000000c0".parse().unwrap(),
            function: "safeMint(address,string)".into(),
            calldata: Bytes::from(calldata),
            signer: owner,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(handle.hash, hash());
}

#[tokio::test]
async fn ethereum_ledger_confirmed_receipt_ends_stream() {
    let mut server = Server::new_async().await;
    mock_method(
        &mut server,
        "eth_getTransactionReceipt",
        json!({"status": "0x1", "blockNumber": "0x10"}),
    )
    .await;
    let ledger = EthereumLedger::new(rpc(&server), fast_policy(1));

    let updates = collect(&ledger).await;

    assert_eq!(
        updates,
        vec![
            TxStatusUpdate::Pending,
            TxStatusUpdate::Confirmed { hash: hash() }
        ]
    );
}

#[tokio::test]
async fn ethereum_ledger_unbounded_timeout_still_polls() {
    let mut server = Server::new_async().await;
    mock_method(
        &mut server,
        "eth_getTransactionReceipt",
        json!({"status": "0x1", "blockNumber": "0x10"}),
    )
    .await;
    let policy = ReceiptPolicy {
        timeout: Duration::MAX,
        ..fast_policy(1)
    };
    let ledger = EthereumLedger::new(rpc(&server), policy);

    let updates = collect(&ledger).await;

    assert_eq!(
        updates.last(),
        Some(&TxStatusUpdate::Confirmed { hash: hash() })
    );
}

#[tokio::test]
async fn ethereum_ledger_reverted_receipt_fails() {
    let mut server = Server::new_async().await;
    mock_method(
        &mut server,
        "eth_getTransactionReceipt",
        json!({"status": "0x0", "blockNumber": "0x10"}),
    )
    .await;
    let ledger = EthereumLedger::new(rpc(&server), fast_policy(1));

    let updates = collect(&ledger).await;

    assert_eq!(
        updates.last(),
        Some(&TxStatusUpdate::Failed {
            reason: "reverted".into()
        })
    );
}

#[tokio::test]
async fn ethereum_ledger_shallow_receipt_confirms_then_times_out() {
    let mut server = Server::new_async().await;
    mock_method(
        &mut server,
        "eth_getTransactionReceipt",
        json!({"status": "0x1", "blockNumber": "0x10"}),
    )
    .await;
    mock_method(&mut server, "eth_blockNumber", json!("0x11")).await;
    let ledger = EthereumLedger::new(rpc(&server), fast_policy(3));

    let updates = collect(&ledger).await;

    assert_eq!(updates[0], TxStatusUpdate::Pending);
    assert_eq!(updates[1], TxStatusUpdate::Confirming);
    assert_eq!(updates.len(), 3);
    assert!(matches!(
        &updates[2],
        TxStatusUpdate::Failed { reason } if reason.starts_with("not confirmed within")
    ));
}

#[tokio::test]
async fn ethereum_ledger_rejected_submission_is_rpc_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 4001, "message": "User denied transaction signature"}})
                .to_string(),
        )
        .create_async()
        .await;
    let ledger = EthereumLedger::new(rpc(&server), fast_policy(1));
    let owner: Address = OWNER.parse().unwrap();

    let err = ledger
        .submit(ContractCall {
            contract: owner,
            function: "registerSubname(string)".into(),
            calldata: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            signer: owner,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Rpc { code: 4001, .. }));
}

#[tokio::test]
async fn rpc_wallet_falls_back_to_eth_accounts() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({"method": "eth_requestAccounts"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "method not found"}})
                .to_string(),
        )
        .create_async()
        .await;
    mock_method(&mut server, "eth_accounts", json!([OWNER])).await;
    let wallet = RpcWalletSession::new(rpc(&server), None);
    assert!(!wallet.session().await.is_connected);

    let session = wallet.connect().await.unwrap();

    let owner: Address = OWNER.parse().unwrap();
    assert_eq!(session.active_account(), Some(owner));
    assert_eq!(wallet.session().await, session);

    wallet.disconnect().await.unwrap();
    assert_eq!(wallet.session().await.active_account(), None);
}

#[tokio::test]
async fn rpc_wallet_without_accounts_cannot_connect() {
    let mut server = Server::new_async().await;
    mock_method(&mut server, "eth_requestAccounts", json!([])).await;
    let wallet = RpcWalletSession::new(rpc(&server), None);

    assert_eq!(wallet.connect().await.unwrap_err(), WalletError::NoAccounts);
}
