//! NodeClient tests against a mock node REST API.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use contract_deployer::config::TrackerConfig;
use contract_deployer::contract::ContractReader;
use contract_deployer::node::{NodeApi, NodeClient, NodeError};
use contract_deployer::proofs::{sign_primary, KeypairSigner, SigningDevice};
use contract_deployer::transaction::{
    Operation, ParamValue, SignedTransaction, TransferParams, TxBuilder, TxId,
};
use contract_deployer::{Deployer, TrackedOutcome, TrackingMode};

mod common;
use common::{start_http_node, test_network, HttpNodeState, CONTRACT_ID, RECIPIENT};

async fn signed_transfer(signer: &KeypairSigner) -> SignedTransaction {
    let network = test_network("http://unused", 1_000);
    let unsigned = TxBuilder::new(&network, signer.public_key())
        .at_timestamp(1_700_000_000_000)
        .build(Operation::Transfer(TransferParams {
            recipient: RECIPIENT.to_string(),
            amount: 100_000_000,
            ..Default::default()
        }))
        .unwrap();
    sign_primary(unsigned, signer).await.unwrap()
}

fn client_for(addr: std::net::SocketAddr, api_key: &str) -> NodeClient {
    let mut network = test_network(&format!("http://{}", addr), 5_000);
    network.api_key = api_key.to_string();
    NodeClient::new(&network).unwrap()
}

#[tokio::test]
async fn test_broadcast_posts_wire_format() {
    let (addr, state) = start_http_node(HttpNodeState::default()).await;
    let client = client_for(addr, "node-secret");
    let signer = KeypairSigner::generate();
    let tx = signed_transfer(&signer).await;

    let accepted = client.broadcast(&tx).await.unwrap();

    assert_eq!(accepted.id, tx.id().to_string());
    assert_eq!(accepted.fee, 100_000);

    let sent = state.broadcasts.lock().unwrap()[0].clone();
    assert_eq!(sent["type"], 4);
    assert_eq!(sent["version"], 3);
    assert_eq!(sent["recipient"], RECIPIENT);
    assert_eq!(sent["amount"], 100_000_000);
    assert_eq!(sent["senderPublicKey"], signer.public_key().to_string());
    assert_eq!(sent["proofs"].as_array().unwrap().len(), 1);
    assert_eq!(
        state.api_keys.lock().unwrap()[0].as_deref(),
        Some("node-secret")
    );
}

#[tokio::test]
async fn test_rejection_uses_node_message() {
    let (addr, _state) = start_http_node(HttpNodeState {
        reject_with: Some((400, "State check failed. Reason: insufficient fee".to_string())),
        ..Default::default()
    })
    .await;
    let client = client_for(addr, "");
    let tx = signed_transfer(&KeypairSigner::generate()).await;

    let err = client.broadcast(&tx).await.unwrap_err();

    assert_eq!(
        err,
        NodeError::Rejected {
            status: 400,
            message: "State check failed. Reason: insufficient fee".to_string(),
        }
    );
}

#[tokio::test]
async fn test_missing_transaction_is_not_found() {
    let (addr, state) = start_http_node(HttpNodeState {
        info_misses: 1,
        ..Default::default()
    })
    .await;
    let client = client_for(addr, "");
    let id = TxId([9u8; 32]);

    let err = client.transaction_info(&id).await.unwrap_err();
    assert!(err.is_not_found());

    let record = client.transaction_info(&id).await.unwrap();
    assert_eq!(record.id, id.to_string());
    assert_eq!(record.timestamp, 1_700_000_000_000);
    assert_eq!(state.info_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_contract_reads() {
    let (addr, _state) = start_http_node(HttpNodeState::default()).await;
    let node: Arc<dyn NodeApi> = Arc::new(client_for(addr, ""));
    let reader = ContractReader::new(node);

    assert_eq!(reader.integer_value(CONTRACT_ID, "counter").await.unwrap(), 7);

    let err = reader.string_value(CONTRACT_ID, "counter").await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::UnexpectedValueType { expected: "string", actual: "integer", .. }
    ));

    let value = reader.value("other", "greeting").await.unwrap();
    assert_eq!(value.value, ParamValue::String("hello".to_string()));

    assert!(reader.value(CONTRACT_ID, "missing").await.unwrap_err().is_not_found());

    let info = reader.info(CONTRACT_ID).await.unwrap();
    assert_eq!(info.contract_id, CONTRACT_ID);
    assert_eq!(info.version, Some(2));
    assert_eq!(info.extra["imageHash"], "ff00");
}

#[tokio::test]
async fn test_boolean_and_binary_reads() {
    let (addr, _state) = start_http_node(HttpNodeState::default()).await;
    let node: Arc<dyn NodeApi> = Arc::new(client_for(addr, ""));
    let reader = ContractReader::new(node);

    assert!(reader.boolean_value(CONTRACT_ID, "active").await.unwrap());
    assert_eq!(reader.binary_value(CONTRACT_ID, "blob").await.unwrap(), vec![1, 2]);

    let err = reader.boolean_value(CONTRACT_ID, "blob").await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::UnexpectedValueType { expected: "boolean", actual: "binary", .. }
    ));

    let err = reader.binary_value(CONTRACT_ID, "counter").await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::UnexpectedValueType { expected: "binary", actual: "integer", .. }
    ));
}

#[tokio::test]
async fn test_executed_transaction_decoding() {
    let (addr, _state) = start_http_node(HttpNodeState::default()).await;
    let client = client_for(addr, "");
    let id = TxId([3u8; 32]);

    let result = client.executed_transaction_for(&id).await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.tx.unwrap().id, id.to_string());
}

#[tokio::test]
async fn test_deployer_over_http() {
    let (addr, state) = start_http_node(HttpNodeState {
        info_misses: 2,
        ..Default::default()
    })
    .await;
    let network = Arc::new(test_network(&format!("http://{}", addr), 5_000));
    let node: Arc<dyn NodeApi> = Arc::new(NodeClient::new(&network).unwrap());
    let tracker = TrackerConfig {
        poll_interval_ms: 20,
        max_poll_attempts: None,
    };
    let deployer = Deployer::new(network, node, Arc::new(KeypairSigner::generate()), &tracker);

    let outcome = deployer
        .transfer(TransferParams {
            recipient: RECIPIENT.to_string(),
            amount: 5,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(matches!(outcome, TrackedOutcome::Included(_)));
    assert_eq!(state.broadcasts.lock().unwrap().len(), 1);
    assert_eq!(state.info_calls.load(Ordering::SeqCst), 3);

    let id: TxId = outcome.tx_id().parse().unwrap();
    let again = deployer
        .await_transaction(&id, TrackingMode::ExecutionAware)
        .await
        .unwrap();
    assert!(matches!(again, TrackedOutcome::Executed(_)));
}
