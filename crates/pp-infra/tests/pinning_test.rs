use bytes::Bytes;
use mockito::{Matcher, Server};
use serde_json::json;
use tokio::sync::mpsc;

use pp_core::ids::ContentId;
use pp_core::ports::{BrokerError, PinningError, PinningPort, UploadBrokerPort, UploadTarget};
use pp_infra::{HttpUploadBroker, PinataClient};

#[tokio::test]
async fn pinata_pin_sends_file_with_bearer_and_builds_gateway_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/pinning/pinFileToIPFS")
        .match_header("authorization", "Bearer test-jwt")
        .match_body(Matcher::Regex(
            r#"name="file"; filename="card.png""#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"IpfsHash":"QmTest","PinSize":4,"Timestamp":"2024-01-01T00:00:00Z"}"#)
        .expect(1)
        .create_async()
        .await;
    let client = PinataClient::new(
        reqwest::Client::new(),
        server.url(),
        "test-jwt",
        "https://gateway.pinata.cloud/",
    );

    let pinned = client
        .pin(Bytes::from_static(b"\x89PNG"), "card.png")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(pinned.content_url, "https://gateway.pinata.cloud/ipfs/QmTest");
    assert_eq!(pinned.content_id, Some(ContentId::from("QmTest")));
}

#[tokio::test]
async fn pinata_service_error_carries_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pinning/pinFileToIPFS")
        .with_status(401)
        .with_body("invalid authentication credentials")
        .create_async()
        .await;
    let client = PinataClient::new(reqwest::Client::new(), server.url(), "bad", "https://gw");

    let err = client
        .pin(Bytes::from_static(b"data"), "a.png")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PinningError::Service {
            status: 401,
            message: "invalid authentication credentials".into()
        }
    );
}

#[tokio::test]
async fn pinata_unreachable_is_network_error() {
    let client = PinataClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        "jwt",
        "https://gw",
    );

    let err = client
        .pin(Bytes::from_static(b"data"), "a.png")
        .await
        .unwrap_err();

    assert!(matches!(err, PinningError::Network(_)));
}

#[tokio::test]
async fn broker_runs_target_transfer_gateway_sequence() {
    let mut server = Server::new_async().await;
    let upload_url = format!("{}/direct/abc", server.url());
    let target_mock = server
        .mock("POST", "/api/pinata/upload-url")
        .match_body(Matcher::Json(json!({"name": "doc.pdf", "maxSizeInMB": 50})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"uploadUrl": upload_url, "cid": "bafyCID"}).to_string())
        .create_async()
        .await;
    let put_mock = server
        .mock("PUT", "/direct/abc")
        .match_header("content-type", "application/octet-stream")
        .match_body("0123456789")
        .with_status(200)
        .create_async()
        .await;
    let gateway_mock = server
        .mock("GET", "/api/pinata/gateway-url/bafyCID")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"gatewayUrl":"https://gw.example/ipfs/bafyCID"}"#)
        .create_async()
        .await;
    let broker = HttpUploadBroker::new(reqwest::Client::new(), server.url()).with_chunk_size(4);

    let target = broker.request_upload_target("doc.pdf", 50).await.unwrap();
    assert_eq!(target.content_id, ContentId::from("bafyCID"));

    let (tx, mut rx) = mpsc::channel(16);
    broker
        .transfer(&target, Bytes::from_static(b"0123456789"), tx)
        .await
        .unwrap();
    let mut seen = Vec::new();
    while let Some(progress) = rx.recv().await {
        seen.push(progress.transferred);
    }
    assert_eq!(seen, vec![4, 8, 10]);

    let url = broker.resolve_gateway_url(&target.content_id).await.unwrap();
    assert_eq!(url, "https://gw.example/ipfs/bafyCID");

    target_mock.assert_async().await;
    put_mock.assert_async().await;
    gateway_mock.assert_async().await;
}

#[tokio::test]
async fn broker_rejected_transfer_is_service_error() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/direct/expired")
        .with_status(403)
        .with_body("signature expired")
        .create_async()
        .await;
    let broker = HttpUploadBroker::new(reqwest::Client::new(), server.url());
    let target = UploadTarget {
        upload_url: format!("{}/direct/expired", server.url()),
        content_id: ContentId::from("bafyCID"),
    };
    let (tx, _rx) = mpsc::channel(16);

    let err = broker
        .transfer(&target, Bytes::from_static(b"abc"), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, BrokerError::Service { status: 403, .. }));
}
