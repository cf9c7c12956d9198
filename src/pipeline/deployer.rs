//! Submit-and-track pipeline.

use std::path::Path;
use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::config::{NetworkConfig, TrackerConfig};
use crate::error::{DeployError, DeployResult};
use crate::node::NodeApi;
use crate::proofs::{attach_proofs, sign_primary, ProofsGenerator, SigningDevice};
use crate::tracking::{TrackedOutcome, Tracker, TrackingMode};
use crate::transaction::{
    CallContractParams, CreateContractParams, DataParams, IssueParams, Operation,
    SetScriptParams, TransferParams, TxBuilder, TxId, UpdateContractParams,
};

/// Per-submission overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Pin the transaction timestamp instead of using the wall clock.
    pub timestamp: Option<u64>,
    /// Override the tracking mode derived from the operation kind.
    pub tracking: Option<TrackingMode>,
}

/// Builds, signs, broadcasts and tracks operations for one sender on one network.
pub struct Deployer {
    network: Arc<NetworkConfig>,
    node: Arc<dyn NodeApi>,
    signer: Arc<dyn SigningDevice>,
    proofs: Option<Arc<dyn ProofsGenerator>>,
    broadcaster: Broadcaster,
    tracker: Tracker,
    scripted_sender: bool,
}

impl Deployer {
    pub fn new(
        network: Arc<NetworkConfig>,
        node: Arc<dyn NodeApi>,
        signer: Arc<dyn SigningDevice>,
        tracker_config: &TrackerConfig,
    ) -> Self {
        let tracker = Tracker::new(Arc::clone(&node), &network, tracker_config);
        Self {
            broadcaster: Broadcaster::new(Arc::clone(&node)),
            tracker,
            network,
            node,
            signer,
            proofs: None,
            scripted_sender: false,
        }
    }

    /// Attach extra proofs from `generator` after the primary signature.
    pub fn with_proofs_generator(mut self, generator: Arc<dyn ProofsGenerator>) -> Self {
        self.proofs = Some(generator);
        self
    }

    /// Sender account carries a script; defaulted fees include the additional fee.
    pub fn scripted_sender(mut self, scripted: bool) -> Self {
        self.scripted_sender = scripted;
        self
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn node(&self) -> &Arc<dyn NodeApi> {
        &self.node
    }

    /// Run `operation` through validation, signing, broadcast and tracking.
    pub async fn submit(
        &self,
        operation: Operation,
        options: SubmitOptions,
    ) -> DeployResult<TrackedOutcome> {
        let kind = operation.kind();
        let mode = options.tracking.unwrap_or_else(|| TrackingMode::for_kind(kind));

        let mut builder = TxBuilder::new(&self.network, self.signer.public_key())
            .scripted_sender(self.scripted_sender);
        if let Some(timestamp) = options.timestamp {
            builder = builder.at_timestamp(timestamp);
        }
        let unsigned = builder.build(operation)?;

        let signed = sign_primary(unsigned, self.signer.as_ref()).await?;
        let signed = attach_proofs(signed, self.proofs.as_deref()).await?;

        let id = self.broadcaster.broadcast(signed).await?;
        Ok(self.tracker.track(&id, mode).await?)
    }

    /// Track an already broadcast transaction.
    pub async fn await_transaction(
        &self,
        id: &TxId,
        mode: TrackingMode,
    ) -> DeployResult<TrackedOutcome> {
        Ok(self.tracker.track(id, mode).await?)
    }

    pub async fn transfer(&self, params: TransferParams) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::Transfer(params), SubmitOptions::default())
            .await
    }

    pub async fn data(&self, params: DataParams) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::Data(params), SubmitOptions::default())
            .await
    }

    pub async fn issue(&self, params: IssueParams) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::Issue(params), SubmitOptions::default())
            .await
    }

    pub async fn invoke(&self, params: CallContractParams) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::CallContract(params), SubmitOptions::default())
            .await
    }

    pub async fn set_script(&self, params: SetScriptParams) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::SetScript(params), SubmitOptions::default())
            .await
    }

    pub async fn deploy_contract(
        &self,
        params: CreateContractParams,
    ) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::CreateContract(params), SubmitOptions::default())
            .await
    }

    pub async fn update_contract(
        &self,
        params: UpdateContractParams,
    ) -> DeployResult<TrackedOutcome> {
        self.submit(Operation::UpdateContract(params), SubmitOptions::default())
            .await
    }

    /// Deploy bytecode read from `path`; `params.bytecode` is replaced.
    pub async fn deploy_contract_from_file(
        &self,
        path: &Path,
        mut params: CreateContractParams,
    ) -> DeployResult<TrackedOutcome> {
        params.bytecode = read_bytecode(path).await?;
        self.deploy_contract(params).await
    }

    /// Update a contract with bytecode read from `path`; `params.bytecode` is replaced.
    pub async fn update_contract_from_file(
        &self,
        path: &Path,
        mut params: UpdateContractParams,
    ) -> DeployResult<TrackedOutcome> {
        params.bytecode = read_bytecode(path).await?;
        self.update_contract(params).await
    }
}

async fn read_bytecode(path: &Path) -> DeployResult<Vec<u8>> {
    let bytecode = tokio::fs::read(path).await.map_err(|source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), size = bytecode.len(), "Bytecode loaded");
    Ok(bytecode)
}
