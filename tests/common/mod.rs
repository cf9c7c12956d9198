//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use contract_deployer::config::{FeeSchedule, NetworkConfig, TrackerConfig};
use contract_deployer::node::{
    BroadcastedTx, ContractInfo, ExecutedTxResult, NodeApi, NodeError, NodeResult,
};
use contract_deployer::transaction::{ContractParam, SignedTransaction, TxId};

pub const RECIPIENT: &str = "3MpHCHnKPqXVEbypoGFSQq3r2qNZVqfe7zY";
pub const CONTRACT_ID: &str = "FzXKFUN1VKSr6D5LgxmHEaD9rPkK3uwnHsStMA3SrnSJ";

pub fn test_network(node_api: &str, node_timeout_ms: u64) -> NetworkConfig {
    NetworkConfig {
        name: "testnet".to_string(),
        node_api: node_api.to_string(),
        node_timeout_ms,
        chain_id: b'T',
        api_key: String::new(),
        fees: FeeSchedule {
            transfer: 100_000,
            invoke: 500_000,
            issue: 100_000_000,
            set_script: 1_000_000,
            set_wasm_script: 10_000_000,
            additional: 400_000,
        },
    }
}

pub fn tracker_config() -> TrackerConfig {
    TrackerConfig {
        poll_interval_ms: 1_000,
        max_poll_attempts: None,
    }
}

/// Scripted response for a polled endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Always not found.
    Never,
    /// Found on the n-th call (1-based); earlier calls return not found.
    OnAttempt(usize),
}

impl Readiness {
    fn ready(self, call: usize) -> bool {
        match self {
            Readiness::Never => false,
            Readiness::OnAttempt(n) => call >= n,
        }
    }
}

/// In-memory node with call counters and scripted answers.
pub struct MockNode {
    pub broadcast_calls: AtomicUsize,
    pub info_calls: AtomicUsize,
    pub executed_calls: AtomicUsize,
    broadcasted: Mutex<Vec<SignedTransaction>>,
    broadcast_error: Mutex<Option<NodeError>>,
    inclusion: Readiness,
    execution: Readiness,
    execution_status: (i32, Option<String>),
    values: Mutex<HashMap<(String, String), ContractParam>>,
}

impl MockNode {
    pub fn new(inclusion: Readiness) -> Self {
        Self {
            broadcast_calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            executed_calls: AtomicUsize::new(0),
            broadcasted: Mutex::new(Vec::new()),
            broadcast_error: Mutex::new(None),
            inclusion,
            execution: Readiness::Never,
            execution_status: (0, None),
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_execution(mut self, readiness: Readiness, status_code: i32, message: Option<&str>) -> Self {
        self.execution = readiness;
        self.execution_status = (status_code, message.map(str::to_string));
        self
    }

    pub fn rejecting_broadcast(self, error: NodeError) -> Self {
        *self.broadcast_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_value(self, address: &str, param: ContractParam) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert((address.to_string(), param.key.clone()), param);
        self
    }

    pub fn broadcasted(&self) -> Vec<SignedTransaction> {
        self.broadcasted.lock().unwrap().clone()
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcast_calls.load(Ordering::SeqCst)
    }

    pub fn info_count(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn executed_count(&self) -> usize {
        self.executed_calls.load(Ordering::SeqCst)
    }

    fn record_for(&self, id: &TxId) -> BroadcastedTx {
        let broadcasted = self.broadcasted.lock().unwrap();
        match broadcasted.iter().find(|tx| tx.id() == *id) {
            Some(tx) => record_of(tx),
            None => BroadcastedTx {
                id: id.to_string(),
                sender_public_key: String::new(),
                tx_type: 4,
                version: 3,
                fee: 0,
                timestamp: 0,
            },
        }
    }
}

pub fn record_of(tx: &SignedTransaction) -> BroadcastedTx {
    BroadcastedTx {
        id: tx.id().to_string(),
        sender_public_key: tx.sender_public_key().to_string(),
        tx_type: tx.kind().type_id(),
        version: tx.kind().version(),
        fee: tx.fee(),
        timestamp: tx.unsigned().timestamp,
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn broadcast(&self, tx: &SignedTransaction) -> NodeResult<BroadcastedTx> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.broadcast_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.broadcasted.lock().unwrap().push(tx.clone());
        Ok(record_of(tx))
    }

    async fn transaction_info(&self, id: &TxId) -> NodeResult<BroadcastedTx> {
        let call = self.info_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.inclusion.ready(call) {
            Ok(self.record_for(id))
        } else {
            Err(NodeError::NotFound(format!("transactions/info/{}", id)))
        }
    }

    async fn executed_transaction_for(&self, id: &TxId) -> NodeResult<ExecutedTxResult> {
        let call = self.executed_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.execution.ready(call) {
            return Err(NodeError::NotFound(format!("contracts/executed-tx-for/{}", id)));
        }
        let original = self.record_for(id);
        Ok(ExecutedTxResult {
            record: BroadcastedTx {
                id: format!("exec-{}", original.id),
                sender_public_key: "node".to_string(),
                tx_type: 105,
                version: 1,
                fee: 0,
                timestamp: original.timestamp,
            },
            status_code: self.execution_status.0,
            error_message: self.execution_status.1.clone(),
            tx: Some(original),
        })
    }

    async fn contract_value(&self, address: &str, key: &str) -> NodeResult<ContractParam> {
        self.values
            .lock()
            .unwrap()
            .get(&(address.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| NodeError::NotFound(format!("contracts/{}/{}", address, key)))
    }

    async fn contract_info(&self, address: &str) -> NodeResult<ContractInfo> {
        Ok(ContractInfo {
            contract_id: address.to_string(),
            version: Some(1),
            active: Some(true),
            extra: serde_json::Map::new(),
        })
    }
}

/// State shared by the mock HTTP node's handlers.
#[derive(Default)]
pub struct HttpNodeState {
    pub broadcasts: Mutex<Vec<Value>>,
    pub api_keys: Mutex<Vec<Option<String>>>,
    pub info_calls: AtomicUsize,
    /// Number of `transactions/info` calls answered 404 before the record appears.
    pub info_misses: usize,
    /// Reject broadcasts with this status and message.
    pub reject_with: Option<(u16, String)>,
}

/// Start a mock node REST API on an ephemeral port.
pub async fn start_http_node(state: HttpNodeState) -> (SocketAddr, Arc<HttpNodeState>) {
    let state = Arc::new(state);
    let app = Router::new()
        .route("/transactions/broadcast", post(broadcast_handler))
        .route("/transactions/info/{id}", get(info_handler))
        .route("/contracts/executed-tx-for/{id}", get(executed_handler))
        .route("/contracts/info/{address}", get(contract_info_handler))
        .route("/contracts/{address}/{key}", get(contract_value_handler))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn broadcast_handler(
    State(state): State<Arc<HttpNodeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let api_key = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.api_keys.lock().unwrap().push(api_key);
    state.broadcasts.lock().unwrap().push(body.clone());

    if let Some((status, message)) = &state.reject_with {
        let status = StatusCode::from_u16(*status).unwrap();
        return (status, Json(json!({"error": 112, "message": message})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": body["id"],
            "senderPublicKey": body["senderPublicKey"],
            "type": body["type"],
            "version": body["version"],
            "fee": body["fee"],
            "timestamp": body["timestamp"],
        })),
    )
}

async fn info_handler(
    State(state): State<Arc<HttpNodeState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let call = state.info_calls.fetch_add(1, Ordering::SeqCst);
    if call < state.info_misses {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": 311, "message": "transactions does not exist"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "senderPublicKey": "pk",
            "type": 4,
            "version": 3,
            "fee": 100000,
            "timestamp": "1700000000000",
            "height": 42
        })),
    )
}

async fn executed_handler(Path(id): Path<String>) -> impl IntoResponse {
    Json(json!({
        "id": "exec",
        "senderPublicKey": "node",
        "type": 105,
        "version": 1,
        "fee": 0,
        "timestamp": 1,
        "statusCode": 0,
        "tx": {
            "id": id,
            "senderPublicKey": "pk",
            "type": 104,
            "version": 7,
            "fee": 500000,
            "timestamp": 1
        }
    }))
}

async fn contract_info_handler(Path(address): Path<String>) -> impl IntoResponse {
    Json(json!({
        "contractId": address,
        "imageHash": "ff00",
        "version": 2,
        "active": true
    }))
}

async fn contract_value_handler(Path((address, key)): Path<(String, String)>) -> impl IntoResponse {
    if key == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "no data"})));
    }
    let value = if key == "active" {
        json!({"type": "boolean", "key": key, "value": true})
    } else if key == "blob" {
        json!({"type": "binary", "key": key, "value": "base64:AQI="})
    } else if address == CONTRACT_ID {
        json!({"type": "integer", "key": key, "value": 7})
    } else {
        json!({"type": "string", "key": key, "value": "hello"})
    };
    (StatusCode::OK, Json(value))
}
