//! Additional proof sources for multi-party transactions.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};

use crate::proofs::signer::SigningDevice;
use crate::proofs::ProofError;
use crate::transaction::{Proof, TxId};

/// Produces extra proofs for a transaction that already carries its primary signature.
///
/// Implementations may suspend arbitrarily long, e.g. while co-signers approve.
#[async_trait]
pub trait ProofsGenerator: Send + Sync {
    /// Return proofs for the transaction with canonical `bytes` and `id`, in the
    /// order they must be attached.
    async fn generate_proofs(&self, bytes: &[u8], id: &TxId) -> Result<Vec<Proof>, ProofError>;
}

/// Signs with a single additional device.
pub struct LocalSigner {
    device: Arc<dyn SigningDevice>,
}

impl LocalSigner {
    pub fn new(device: Arc<dyn SigningDevice>) -> Self {
        Self { device }
    }
}

#[async_trait]
impl ProofsGenerator for LocalSigner {
    async fn generate_proofs(&self, bytes: &[u8], id: &TxId) -> Result<Vec<Proof>, ProofError> {
        tracing::debug!(tx_id = %id, signer = %self.device.public_key(), "Collecting local proof");
        Ok(vec![self.device.sign(bytes).await?])
    }
}

/// Collects approvals from co-signers until a quorum is reached.
///
/// All co-signers are asked at once. Collection stops as soon as `quorum`
/// approvals are in, or once the outstanding requests can no longer reach it;
/// requests still in flight are dropped. Proofs are returned in co-signer order,
/// whatever order the approvals arrive in.
pub struct MultisigQuorumCollector {
    co_signers: Vec<Arc<dyn SigningDevice>>,
    quorum: usize,
}

impl MultisigQuorumCollector {
    pub fn new(co_signers: Vec<Arc<dyn SigningDevice>>, quorum: usize) -> Result<Self, ProofError> {
        if quorum == 0 || quorum > co_signers.len() {
            return Err(ProofError::InvalidQuorum {
                quorum,
                signers: co_signers.len(),
            });
        }
        Ok(Self { co_signers, quorum })
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }
}

#[async_trait]
impl ProofsGenerator for MultisigQuorumCollector {
    async fn generate_proofs(&self, bytes: &[u8], id: &TxId) -> Result<Vec<Proof>, ProofError> {
        let mut pending: FuturesUnordered<_> = self
            .co_signers
            .iter()
            .enumerate()
            .map(|(index, signer)| async move { (index, signer.sign(bytes).await) })
            .collect();

        let mut approvals = Vec::with_capacity(self.quorum);
        while let Some((index, result)) = pending.next().await {
            match result {
                Ok(proof) => {
                    approvals.push((index, proof));
                    if approvals.len() == self.quorum {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        tx_id = %id,
                        signer = %self.co_signers[index].public_key(),
                        error = %e,
                        "Co-signer did not approve"
                    );
                    if approvals.len() + pending.len() < self.quorum {
                        break;
                    }
                }
            }
        }

        if approvals.len() < self.quorum {
            return Err(ProofError::QuorumNotReached {
                approved: approvals.len(),
                required: self.quorum,
            });
        }

        approvals.sort_by_key(|(index, _)| *index);
        tracing::info!(
            tx_id = %id,
            approvals = approvals.len(),
            outstanding = pending.len(),
            "Multisig quorum reached"
        );
        Ok(approvals.into_iter().map(|(_, proof)| proof).collect())
    }
}

/// Adds no proofs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProofs;

#[async_trait]
impl ProofsGenerator for NoOpProofs {
    async fn generate_proofs(&self, _bytes: &[u8], _id: &TxId) -> Result<Vec<Proof>, ProofError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::PublicKey;
    use std::time::Duration;

    /// Approves after `delay_ms`, or refuses.
    struct CoSigner {
        tag: u8,
        delay_ms: u64,
        approve: bool,
    }

    #[async_trait]
    impl SigningDevice for CoSigner {
        fn public_key(&self) -> PublicKey {
            PublicKey([self.tag; 32])
        }

        async fn sign(&self, _bytes: &[u8]) -> Result<Proof, ProofError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            if self.approve {
                Ok(Proof::new(vec![self.tag]))
            } else {
                Err(ProofError::Signer(format!("signer {} refused", self.tag)))
            }
        }
    }

    fn co_signer(tag: u8, delay_ms: u64, approve: bool) -> Arc<dyn SigningDevice> {
        Arc::new(CoSigner { tag, delay_ms, approve })
    }

    /// Never answers.
    struct SilentSigner(u8);

    #[async_trait]
    impl SigningDevice for SilentSigner {
        fn public_key(&self) -> PublicKey {
            PublicKey([self.0; 32])
        }

        async fn sign(&self, _bytes: &[u8]) -> Result<Proof, ProofError> {
            std::future::pending().await
        }
    }

    fn tags(proofs: &[Proof]) -> Vec<u8> {
        proofs.iter().map(|p| p.as_bytes()[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_keeps_signer_order() {
        // Later signers answer first.
        let collector = MultisigQuorumCollector::new(
            vec![co_signer(1, 300, true), co_signer(2, 200, true), co_signer(3, 100, true)],
            3,
        )
        .unwrap();

        let proofs = collector.generate_proofs(b"tx", &TxId([0u8; 32])).await.unwrap();
        assert_eq!(tags(&proofs), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_skips_refusals() {
        let collector = MultisigQuorumCollector::new(
            vec![co_signer(1, 10, false), co_signer(2, 10, true), co_signer(3, 10, true)],
            2,
        )
        .unwrap();

        let proofs = collector.generate_proofs(b"tx", &TxId([0u8; 32])).await.unwrap();
        assert_eq!(tags(&proofs), vec![2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_ignores_silent_signer() {
        let collector = MultisigQuorumCollector::new(
            vec![Arc::new(SilentSigner(9)), co_signer(1, 200, true), co_signer(2, 100, true)],
            2,
        )
        .unwrap();

        let proofs = tokio::time::timeout(
            Duration::from_secs(3600),
            collector.generate_proofs(b"tx", &TxId([0u8; 32])),
        )
        .await
        .expect("collector waited on a silent co-signer")
        .unwrap();
        assert_eq!(tags(&proofs), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_stops_when_unreachable() {
        // Two refusals leave only the silent signer; quorum 2 is out of reach.
        let collector = MultisigQuorumCollector::new(
            vec![co_signer(1, 10, false), Arc::new(SilentSigner(9)), co_signer(2, 20, false)],
            2,
        )
        .unwrap();

        let err = tokio::time::timeout(
            Duration::from_secs(3600),
            collector.generate_proofs(b"tx", &TxId([0u8; 32])),
        )
        .await
        .expect("collector waited on a silent co-signer")
        .unwrap_err();
        assert_eq!(err, ProofError::QuorumNotReached { approved: 0, required: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_not_reached() {
        let collector = MultisigQuorumCollector::new(
            vec![co_signer(1, 10, false), co_signer(2, 5, true)],
            2,
        )
        .unwrap();

        let err = collector.generate_proofs(b"tx", &TxId([0u8; 32])).await.unwrap_err();
        assert_eq!(err, ProofError::QuorumNotReached { approved: 1, required: 2 });
    }

    #[test]
    fn test_invalid_quorum() {
        assert!(MultisigQuorumCollector::new(vec![co_signer(1, 0, true)], 0).is_err());
        assert!(MultisigQuorumCollector::new(vec![co_signer(1, 0, true)], 2).is_err());
    }

    #[tokio::test]
    async fn test_local_signer_and_noop() {
        let local = LocalSigner::new(co_signer(7, 0, true));
        let proofs = local.generate_proofs(b"tx", &TxId([0u8; 32])).await.unwrap();
        assert_eq!(tags(&proofs), vec![7]);

        let none = NoOpProofs.generate_proofs(b"tx", &TxId([0u8; 32])).await.unwrap();
        assert!(none.is_empty());
    }
}
