//! HTTP tests for the JSON-RPC ledger.
//!
//! Uses `wiremock` to stand in for a Solana RPC node.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zkhole_sdk::SdkError;
use zkhole_sdk::domain::{Ledger, Operation, OperationKind, SignedOperation};
use zkhole_sdk::infra::RpcLedger;

fn ledger(server: &MockServer) -> RpcLedger {
    RpcLedger::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

#[tokio::test]
async fn test_get_balance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getBalance"})))
        .respond_with(rpc_result(json!({"context": {"slot": 1}, "value": 2_500_000_000u64})))
        .mount(&server)
        .await;

    let balance = ledger(&server).get_balance("Owner111").await.unwrap();
    assert_eq!(balance, 2_500_000_000);
}

#[tokio::test]
async fn test_get_token_balance_sums_accounts() {
    let server = MockServer::start().await;
    let account = |amount: f64| {
        json!({
            "pubkey": "Acct",
            "account": {
                "data": {
                    "parsed": {
                        "info": {
                            "tokenAmount": {"amount": "0", "decimals": 6, "uiAmount": amount}
                        },
                        "type": "account"
                    },
                    "program": "spl-token"
                }
            }
        })
    };
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getTokenAccountsByOwner"})))
        .respond_with(rpc_result(json!({
            "context": {"slot": 1},
            "value": [account(12.5), account(7.5)]
        })))
        .mount(&server)
        .await;

    let balance = ledger(&server)
        .get_token_balance("Owner111", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
        .await
        .unwrap();
    assert_eq!(balance, 20.0);
}

#[tokio::test]
async fn test_confirm_finalized_signature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "getSignatureStatuses"})))
        .respond_with(rpc_result(json!({
            "context": {"slot": 90},
            "value": [{
                "slot": 88,
                "confirmations": null,
                "err": null,
                "confirmationStatus": "finalized"
            }]
        })))
        .mount(&server)
        .await;

    let confirmation = ledger(&server).confirm("sig").await.unwrap();
    assert!(confirmation.confirmed);
    assert_eq!(confirmation.slot, Some(88));
    assert!(confirmation.error.is_none());
}

#[tokio::test]
async fn test_confirm_failed_and_unknown_signatures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": [["failed"]]})))
        .respond_with(rpc_result(json!({
            "context": {"slot": 90},
            "value": [{
                "slot": 80,
                "err": {"InstructionError": [0, "Custom"]},
                "confirmationStatus": "finalized"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"params": [["unknown"]]})))
        .respond_with(rpc_result(json!({"context": {"slot": 90}, "value": [null]})))
        .mount(&server)
        .await;

    let ledger = ledger(&server);

    let failed = ledger.confirm("failed").await.unwrap();
    assert!(!failed.confirmed);
    assert!(failed.error.is_some());

    let unknown = ledger.confirm("unknown").await.unwrap();
    assert!(!unknown.confirmed);
    assert!(unknown.slot.is_none());
}

#[tokio::test]
async fn test_rpc_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "Invalid param: WrongSize"}
        })))
        .mount(&server)
        .await;

    let result = ledger(&server).get_balance("bad").await;
    match result {
        Err(SdkError::Network(e)) => assert!(e.context.contains("-32602")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_body_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    assert!(matches!(
        ledger(&server).get_balance("Owner111").await,
        Err(SdkError::Network(_))
    ));
}

#[tokio::test]
async fn test_slow_node_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            rpc_result(json!({"context": {"slot": 1}, "value": 1}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let ledger = RpcLedger::new(&server.uri(), Duration::from_millis(50)).unwrap();
    match ledger.get_balance("Owner111").await {
        Err(SdkError::Network(e)) => assert!(e.context.contains("timed out")),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_not_supported() {
    let server = MockServer::start().await;
    let signed = SignedOperation {
        operation: Operation::new("tx_1", OperationKind::Transfer, "owner"),
        wallet_signature: None,
    };
    assert!(matches!(
        ledger(&server).submit(&signed).await,
        Err(SdkError::NotSupported(_))
    ));
}
