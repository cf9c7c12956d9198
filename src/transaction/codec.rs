//! Canonical byte encoding of unsigned transactions.
//!
//! Layout: type byte, version byte, then kind-specific fields in fixed order,
//! followed by fee, optional fee asset and timestamp. Integers are big-endian,
//! strings and short byte strings are `u16` length-prefixed, bytecode and
//! parameter values `u32` length-prefixed, optionals carry a 0/1 flag byte and
//! lists a `u16` count.

use sha2::{Digest, Sha256};

use crate::transaction::types::{
    Base58, ContractParam, ParamValue, Payment, StoredContract, TxBody, TxId, UnsignedTransaction,
};

#[derive(Default)]
struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn bool(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    // Lengths were bounded by the builder; truncation here would be a builder bug.
    fn short_bytes(&mut self, bytes: &[u8]) {
        self.u16(bytes.len() as u16);
        self.raw(bytes);
    }

    fn long_bytes(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.raw(bytes);
    }

    fn str(&mut self, s: &str) {
        self.short_bytes(s.as_bytes());
    }

    fn optional_id(&mut self, id: Option<&Base58>) {
        match id {
            Some(id) => {
                self.u8(1);
                self.short_bytes(id.as_bytes());
            }
            None => self.u8(0),
        }
    }

    fn count(&mut self, n: usize) {
        self.u16(n as u16);
    }

    fn param(&mut self, param: &ContractParam) {
        self.str(&param.key);
        match &param.value {
            ParamValue::Integer(v) => {
                self.u8(0);
                self.i64(*v);
            }
            ParamValue::Boolean(v) => {
                self.u8(1);
                self.bool(*v);
            }
            ParamValue::Binary(v) => {
                self.u8(2);
                self.long_bytes(v);
            }
            ParamValue::String(v) => {
                self.u8(3);
                self.long_bytes(v.as_bytes());
            }
        }
    }

    fn params(&mut self, params: &[ContractParam]) {
        self.count(params.len());
        for p in params {
            self.param(p);
        }
    }

    fn payments(&mut self, payments: &[Payment]) {
        self.count(payments.len());
        for p in payments {
            match &p.asset_id {
                Some(asset) => {
                    self.u8(1);
                    self.str(asset);
                }
                None => self.u8(0),
            }
            self.u64(p.amount);
        }
    }

    fn stored_contract(&mut self, contract: &StoredContract) {
        self.long_bytes(&contract.bytecode);
        self.str(&contract.bytecode_hash);
    }

    fn strings(&mut self, values: &[String]) {
        self.count(values.len());
        for v in values {
            self.str(v);
        }
    }
}

impl UnsignedTransaction {
    /// Deterministic byte encoding that signatures and the id are computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let kind = self.kind();
        let mut w = ByteWriter::default();
        w.u8(kind.type_id());
        w.u8(kind.version());

        match &self.body {
            TxBody::Transfer(b) => {
                w.raw(&self.sender_public_key.0);
                w.optional_id(b.asset_id.as_ref());
                w.short_bytes(b.recipient.as_bytes());
                w.u64(b.amount);
                w.short_bytes(b.attachment.as_bytes());
            }
            TxBody::Data(b) => {
                w.raw(&self.sender_public_key.0);
                w.params(&b.data);
            }
            TxBody::Issue(b) => {
                w.u8(b.chain_id);
                w.raw(&self.sender_public_key.0);
                w.str(&b.name);
                w.str(&b.description);
                w.u64(b.quantity);
                w.u8(b.decimals);
                w.bool(b.reissuable);
            }
            TxBody::SetScript(b) => {
                w.u8(b.chain_id);
                w.raw(&self.sender_public_key.0);
                w.long_bytes(&b.script);
            }
            TxBody::CreateContract(b) => {
                w.raw(&self.sender_public_key.0);
                w.str(&b.contract_name);
                w.stored_contract(&b.stored_contract);
                w.params(&b.params);
                w.payments(&b.payments);
                w.u8(b.validation_policy.code());
                w.bool(b.is_confidential);
                w.strings(&b.group_owners);
                w.strings(&b.group_participants);
            }
            TxBody::UpdateContract(b) => {
                w.raw(&self.sender_public_key.0);
                w.short_bytes(b.contract_id.as_bytes());
                w.stored_contract(&b.stored_contract);
                w.u8(b.validation_policy.code());
                w.strings(&b.group_owners);
                w.strings(&b.group_participants);
            }
            TxBody::CallContract(b) => {
                w.raw(&self.sender_public_key.0);
                w.short_bytes(b.contract_id.as_bytes());
                w.u32(b.contract_version);
                w.str(&b.contract_engine);
                w.str(&b.call_func);
                w.params(&b.params);
                w.payments(&b.payments);
            }
        }

        w.u64(self.fee);
        w.optional_id(self.fee_asset_id.as_ref());
        w.u64(self.timestamp);
        w.buf
    }

    /// Identifier derived from the canonical bytes.
    pub fn id(&self) -> TxId {
        TxId(Sha256::digest(self.canonical_bytes()).into())
    }
}
