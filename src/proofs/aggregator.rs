//! Primary signature and proof aggregation.

use crate::proofs::generator::ProofsGenerator;
use crate::proofs::signer::SigningDevice;
use crate::proofs::ProofError;
use crate::transaction::{SignedTransaction, UnsignedTransaction};

/// Sign `tx` with the sender's device, producing a single-proof transaction.
pub async fn sign_primary(
    tx: UnsignedTransaction,
    device: &dyn SigningDevice,
) -> Result<SignedTransaction, ProofError> {
    let device_key = device.public_key();
    if device_key != tx.sender_public_key {
        return Err(ProofError::SenderMismatch {
            sender: tx.sender_public_key.to_string(),
            signer: device_key.to_string(),
        });
    }

    let primary = device.sign(&tx.canonical_bytes()).await?;
    Ok(SignedTransaction::new(tx, primary))
}

/// Append the generator's proofs, in returned order, after the primary signature.
pub async fn attach_proofs(
    mut signed: SignedTransaction,
    generator: Option<&dyn ProofsGenerator>,
) -> Result<SignedTransaction, ProofError> {
    let Some(generator) = generator else {
        return Ok(signed);
    };

    let id = signed.id();
    let proofs = generator.generate_proofs(signed.bytes(), &id).await?;
    let added = proofs.len();
    for proof in proofs {
        signed.add_proof(proof);
    }

    tracing::debug!(tx_id = %id, added, total = signed.proofs().len(), "Proofs attached");
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proofs::generator::NoOpProofs;
    use crate::proofs::signer::KeypairSigner;
    use crate::transaction::types::{DataBody, TxBody};
    use crate::transaction::{ContractParam, Proof, PublicKey, TxId};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Fixed {
        proofs: Vec<Proof>,
        seen: Mutex<Option<(Vec<u8>, TxId)>>,
    }

    #[async_trait]
    impl ProofsGenerator for Fixed {
        async fn generate_proofs(&self, bytes: &[u8], id: &TxId) -> Result<Vec<Proof>, ProofError> {
            *self.seen.lock().unwrap() = Some((bytes.to_vec(), *id));
            Ok(self.proofs.clone())
        }
    }

    fn data_tx(sender: PublicKey) -> UnsignedTransaction {
        UnsignedTransaction {
            sender_public_key: sender,
            fee: 100_000,
            fee_asset_id: None,
            timestamp: 5,
            body: TxBody::Data(DataBody { data: vec![ContractParam::integer("k", 1)] }),
        }
    }

    #[tokio::test]
    async fn test_proof_order_is_primary_then_generated() {
        let signer = KeypairSigner::generate();
        let signed = sign_primary(data_tx(signer.public_key()), &signer).await.unwrap();
        let primary = signed.proofs()[0].clone();

        let generator = Fixed {
            proofs: vec![Proof::new(vec![0xA1]), Proof::new(vec![0xB2])],
            seen: Mutex::new(None),
        };
        let signed = attach_proofs(signed, Some(&generator)).await.unwrap();

        assert_eq!(
            signed.proofs(),
            &[primary, Proof::new(vec![0xA1]), Proof::new(vec![0xB2])]
        );

        let (bytes, id) = generator.seen.lock().unwrap().clone().unwrap();
        assert_eq!(bytes, signed.bytes());
        assert_eq!(id, signed.id());
    }

    #[tokio::test]
    async fn test_no_generator_keeps_single_proof() {
        let signer = KeypairSigner::generate();
        let signed = sign_primary(data_tx(signer.public_key()), &signer).await.unwrap();
        let signed = attach_proofs(signed, None).await.unwrap();
        assert_eq!(signed.proofs().len(), 1);

        let signed = attach_proofs(signed, Some(&NoOpProofs)).await.unwrap();
        assert_eq!(signed.proofs().len(), 1);
    }

    #[tokio::test]
    async fn test_sender_mismatch() {
        let signer = KeypairSigner::generate();
        let err = sign_primary(data_tx(PublicKey([9u8; 32])), &signer).await.unwrap_err();
        assert!(matches!(err, ProofError::SenderMismatch { .. }));
    }
}
