//! Signed transactions: id, ordered proofs and the broadcast wire format.

use serde::{Serialize, Serializer};

use crate::transaction::types::{Base58, Proof, PublicKey, TxBody, TxId, TxKind, UnsignedTransaction};

/// An unsigned transaction with its derived id and ordered proofs.
///
/// Proofs can only be appended. The broadcaster takes the transaction by
/// value, so it cannot change after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: UnsignedTransaction,
    id: TxId,
    bytes: Vec<u8>,
    proofs: Vec<Proof>,
}

impl SignedTransaction {
    /// Wrap `tx` with its primary signature.
    pub fn new(tx: UnsignedTransaction, primary: Proof) -> Self {
        let bytes = tx.canonical_bytes();
        let id = tx.id();
        Self {
            tx,
            id,
            bytes,
            proofs: vec![primary],
        }
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    /// Canonical bytes the proofs were produced over.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> TxKind {
        self.tx.kind()
    }

    pub fn fee(&self) -> u64 {
        self.tx.fee
    }

    pub fn sender_public_key(&self) -> PublicKey {
        self.tx.sender_public_key
    }

    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.tx
    }

    /// Proofs in insertion order.
    pub fn proofs(&self) -> &[Proof] {
        &self.proofs
    }

    pub fn add_proof(&mut self, proof: Proof) {
        self.proofs.push(proof);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction<'a> {
    #[serde(rename = "type")]
    tx_type: u8,
    version: u8,
    id: &'a TxId,
    sender_public_key: &'a PublicKey,
    fee: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_asset_id: Option<&'a Base58>,
    timestamp: u64,
    proofs: &'a [Proof],
    #[serde(flatten)]
    body: &'a TxBody,
}

impl Serialize for SignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        WireTransaction {
            tx_type: kind.type_id(),
            version: kind.version(),
            id: &self.id,
            sender_public_key: &self.tx.sender_public_key,
            fee: self.tx.fee,
            fee_asset_id: self.tx.fee_asset_id.as_ref(),
            timestamp: self.tx.timestamp,
            proofs: &self.proofs,
            body: &self.tx.body,
        }
        .serialize(serializer)
    }
}
