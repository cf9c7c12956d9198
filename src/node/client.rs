//! HTTP node client with timeout and error handling.
//!
//! # Responsibilities
//! - Talk to the node REST API
//! - Map HTTP statuses onto `NodeError` (404 → NotFound)
//! - Bound every request with a timeout

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::timeout;
use url::Url;

use crate::config::NetworkConfig;
use crate::node::api::NodeApi;
use crate::node::types::{BroadcastedTx, ContractInfo, ExecutedTxResult, NodeError, NodeResult};
use crate::transaction::{ContractParam, SignedTransaction, TxId};

/// Header carrying the node API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of [`NodeApi`].
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    /// Request timeout duration.
    timeout_duration: Duration,
}

/// Error body returned by the node, e.g. `{"error": 112, "message": "..."}`.
#[derive(Deserialize)]
struct NodeErrorBody {
    message: Option<String>,
}

impl NodeClient {
    /// Create a client for `network`'s node endpoint.
    pub fn new(network: &NetworkConfig) -> NodeResult<Self> {
        let base_url: Url = network.node_api.parse().map_err(|e| {
            NodeError::InvalidUrl(format!("'{}': {}", network.node_api, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NodeError::InvalidUrl(format!("'{}' cannot be a base", network.node_api)));
        }

        let api_key = Some(network.api_key.clone()).filter(|k| !k.is_empty());

        tracing::info!(
            node_api = %base_url,
            network = %network.name,
            chain_id = network.chain_id,
            "Node client initialized"
        );

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            timeout_duration: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = duration;
        self
    }

    fn url(&self, segments: &[&str]) -> NodeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NodeError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> NodeResult<T> {
        let url = self.url(segments)?;
        self.send(self.http.get(url)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> NodeResult<T> {
        let request = match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| NodeError::Transport(e.to_string()))?;
            let status = response.status();
            let url = response.url().path().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| NodeError::Transport(e.to_string()))?;
            Ok::<_, NodeError>((status, url, body))
        };

        let (status, path, body) = match timeout(self.timeout_duration, exchange).await {
            Ok(result) => result?,
            Err(_) => return Err(NodeError::Timeout(self.timeout_duration.as_secs())),
        };

        if status == StatusCode::NOT_FOUND {
            return Err(NodeError::NotFound(path));
        }

        if !status.is_success() {
            let message = serde_json::from_str::<NodeErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            tracing::debug!(status = status.as_u16(), path = %path, message = %message, "Node returned error");
            return Err(NodeError::Rejected { status: status.as_u16(), message });
        }

        serde_json::from_str(&body).map_err(|e| NodeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NodeApi for NodeClient {
    async fn broadcast(&self, tx: &SignedTransaction) -> NodeResult<BroadcastedTx> {
        let url = self.url(&["transactions", "broadcast"])?;
        self.send(self.http.post(url).json(tx)).await
    }

    async fn transaction_info(&self, id: &TxId) -> NodeResult<BroadcastedTx> {
        self.get(&["transactions", "info", &id.to_string()]).await
    }

    async fn executed_transaction_for(&self, id: &TxId) -> NodeResult<ExecutedTxResult> {
        self.get(&["contracts", "executed-tx-for", &id.to_string()]).await
    }

    async fn contract_value(&self, address: &str, key: &str) -> NodeResult<ContractParam> {
        self.get(&["contracts", address, key]).await
    }

    async fn contract_info(&self, address: &str) -> NodeResult<ContractInfo> {
        self.get(&["contracts", "info", address]).await
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
