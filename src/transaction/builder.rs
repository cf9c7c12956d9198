//! Transaction assembly with fee resolution and validation.
//!
//! # Responsibilities
//! - Turn a typed `Operation` into an `UnsignedTransaction`
//! - Resolve fees from the network's fee schedule when the caller gives none
//! - Reject oversized bytecode and malformed parameters before any I/O
//!
//! The builder never touches the network or the filesystem.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::config::NetworkConfig;
use crate::transaction::types::{
    Base58, CallContractBody, CallContractParams, ContractParam, CreateContractBody,
    CreateContractParams, DataBody, DataParams, IssueBody, IssueParams, Operation, Payment,
    PublicKey, SetScriptBody, SetScriptParams, StoredContract, TransferBody, TransferParams,
    TxBody, TxKind, UnsignedTransaction, UpdateContractBody, UpdateContractParams,
    ValidationError, ValidationResult, MAX_BYTECODE_SIZE,
};

const FEE_PER_KB: u64 = 100_000;
const SCRIPT_EXTRA_FEE: u64 = 400_000;
const MAX_ASSET_DECIMALS: u8 = 8;

/// Estimate the fee for installing a compiled script of `script_size` bytes.
pub fn estimate_script_fee(script_size: usize) -> ValidationResult<u64> {
    check_bytecode_size(script_size)?;
    let kilobytes = script_size.div_ceil(1024) as u64;
    Ok(kilobytes * FEE_PER_KB + SCRIPT_EXTRA_FEE)
}

fn check_bytecode_size(size: usize) -> ValidationResult<()> {
    if size > MAX_BYTECODE_SIZE {
        return Err(ValidationError::BytecodeTooLarge { size, max: MAX_BYTECODE_SIZE });
    }
    Ok(())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Builds unsigned transactions for one sender on one network.
pub struct TxBuilder<'a> {
    network: &'a NetworkConfig,
    sender: PublicKey,
    scripted_sender: bool,
    timestamp: Option<u64>,
}

impl<'a> TxBuilder<'a> {
    pub fn new(network: &'a NetworkConfig, sender: PublicKey) -> Self {
        Self {
            network,
            sender,
            scripted_sender: false,
            timestamp: None,
        }
    }

    /// Mark the sender as a scripted account: defaulted fees include the additional fee.
    pub fn scripted_sender(mut self, scripted: bool) -> Self {
        self.scripted_sender = scripted;
        self
    }

    /// Pin the transaction timestamp (milliseconds since epoch).
    pub fn at_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// Fee to charge for `kind`: `explicit` when given, else the network default.
    pub fn resolve_fee(&self, kind: TxKind, explicit: Option<u64>) -> ValidationResult<u64> {
        if let Some(fee) = explicit {
            return Ok(fee);
        }

        let fees = &self.network.fees;
        let base = match kind {
            TxKind::Transfer | TxKind::Data => fees.transfer,
            TxKind::Issue => fees.issue,
            TxKind::CallContract => fees.invoke,
            TxKind::SetScript => fees.set_script,
            TxKind::CreateContract | TxKind::UpdateContract => fees.set_wasm_script,
        };

        if !self.scripted_sender {
            return Ok(base);
        }
        base.checked_add(fees.additional)
            .ok_or_else(|| ValidationError::InvalidField {
                field: "fee",
                reason: format!("{} plus additional fee {} overflows", base, fees.additional),
            })
    }

    /// Validate `operation` and assemble the unsigned transaction.
    pub fn build(&self, operation: Operation) -> ValidationResult<UnsignedTransaction> {
        let kind = operation.kind();
        let fee = self.resolve_fee(kind, operation.explicit_fee())?;
        if fee == 0 {
            return Err(ValidationError::NotPositive { field: "fee" });
        }

        let fee_asset_id = operation
            .fee_asset_id()
            .map(|id| Base58::parse_field("fee_asset_id", id))
            .transpose()?;

        let body = match operation {
            Operation::Transfer(p) => self.transfer_body(p)?,
            Operation::Data(p) => self.data_body(p)?,
            Operation::Issue(p) => self.issue_body(p)?,
            Operation::SetScript(p) => self.set_script_body(p)?,
            Operation::CreateContract(p) => self.create_contract_body(p)?,
            Operation::UpdateContract(p) => self.update_contract_body(p)?,
            Operation::CallContract(p) => self.call_contract_body(p)?,
        };

        let tx = UnsignedTransaction {
            sender_public_key: self.sender,
            fee,
            fee_asset_id,
            timestamp: self.timestamp.unwrap_or_else(now_millis),
            body,
        };

        tracing::debug!(
            kind = %kind,
            fee = tx.fee,
            network = %self.network.name,
            "Transaction built"
        );

        Ok(tx)
    }

    fn transfer_body(&self, p: TransferParams) -> ValidationResult<TxBody> {
        if p.amount == 0 {
            return Err(ValidationError::NotPositive { field: "amount" });
        }
        let attachment = p.attachment.into_bytes();
        if attachment.len() > u16::MAX as usize {
            return Err(ValidationError::InvalidField {
                field: "attachment",
                reason: format!("{} bytes is too long", attachment.len()),
            });
        }

        Ok(TxBody::Transfer(TransferBody {
            recipient: Base58::parse_field("recipient", &p.recipient)?,
            amount: p.amount,
            asset_id: p
                .asset_id
                .as_deref()
                .map(|id| Base58::parse_field("asset_id", id))
                .transpose()?,
            attachment: Base58::from(attachment),
        }))
    }

    fn data_body(&self, p: DataParams) -> ValidationResult<TxBody> {
        if p.entries.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "data",
                reason: "at least one entry is required".into(),
            });
        }
        check_params("data", &p.entries)?;
        Ok(TxBody::Data(DataBody { data: p.entries }))
    }

    fn issue_body(&self, p: IssueParams) -> ValidationResult<TxBody> {
        check_short_text("name", &p.name, false)?;
        check_short_text("description", &p.description, true)?;
        if p.quantity == 0 {
            return Err(ValidationError::NotPositive { field: "quantity" });
        }
        if p.decimals > MAX_ASSET_DECIMALS {
            return Err(ValidationError::InvalidField {
                field: "decimals",
                reason: format!("{} exceeds maximum {}", p.decimals, MAX_ASSET_DECIMALS),
            });
        }

        Ok(TxBody::Issue(IssueBody {
            chain_id: self.network.chain_id,
            name: p.name,
            description: p.description,
            quantity: p.quantity,
            decimals: p.decimals,
            reissuable: p.reissuable,
        }))
    }

    fn set_script_body(&self, p: SetScriptParams) -> ValidationResult<TxBody> {
        let script = check_bytecode(p.script)?;
        Ok(TxBody::SetScript(SetScriptBody {
            chain_id: self.network.chain_id,
            script,
        }))
    }

    fn create_contract_body(&self, p: CreateContractParams) -> ValidationResult<TxBody> {
        check_short_text("contract_name", &p.contract_name, false)?;
        check_params("params", &p.params)?;
        check_payments(&p.payments)?;

        Ok(TxBody::CreateContract(CreateContractBody {
            contract_name: p.contract_name,
            stored_contract: stored_contract(p.bytecode)?,
            params: p.params,
            payments: p.payments,
            validation_policy: p.validation_policy,
            is_confidential: false,
            group_owners: Vec::new(),
            group_participants: Vec::new(),
        }))
    }

    fn update_contract_body(&self, p: UpdateContractParams) -> ValidationResult<TxBody> {
        Ok(TxBody::UpdateContract(UpdateContractBody {
            contract_id: Base58::parse_field("contract_id", &p.contract_id)?,
            stored_contract: stored_contract(p.bytecode)?,
            validation_policy: p.validation_policy,
            group_owners: Vec::new(),
            group_participants: Vec::new(),
        }))
    }

    fn call_contract_body(&self, p: CallContractParams) -> ValidationResult<TxBody> {
        check_short_text("function", &p.function, false)?;
        check_params("params", &p.params)?;
        check_payments(&p.payments)?;

        Ok(TxBody::CallContract(CallContractBody {
            contract_id: Base58::parse_field("contract_id", &p.contract_id)?,
            contract_version: p.contract_version,
            contract_engine: "wasm".to_string(),
            call_func: p.function,
            params: p.params,
            payments: p.payments,
        }))
    }
}

fn check_bytecode(bytecode: Vec<u8>) -> ValidationResult<Vec<u8>> {
    if bytecode.is_empty() {
        return Err(ValidationError::EmptyBytecode);
    }
    check_bytecode_size(bytecode.len())?;
    Ok(bytecode)
}

fn stored_contract(bytecode: Vec<u8>) -> ValidationResult<StoredContract> {
    let bytecode = check_bytecode(bytecode)?;
    let bytecode_hash = hex::encode(Sha256::digest(&bytecode));
    Ok(StoredContract { bytecode, bytecode_hash })
}

fn check_short_text(field: &'static str, value: &str, allow_empty: bool) -> ValidationResult<()> {
    if !allow_empty && value.trim().is_empty() {
        return Err(ValidationError::InvalidField { field, reason: "must not be empty".into() });
    }
    if value.len() > u16::MAX as usize {
        return Err(ValidationError::InvalidField {
            field,
            reason: format!("{} bytes is too long", value.len()),
        });
    }
    Ok(())
}

fn check_params(field: &'static str, params: &[ContractParam]) -> ValidationResult<()> {
    if params.len() > u16::MAX as usize {
        return Err(ValidationError::InvalidField { field, reason: "too many entries".into() });
    }
    let mut seen = HashSet::new();
    for param in params {
        check_short_text(field, &param.key, false)?;
        if !seen.insert(param.key.as_str()) {
            return Err(ValidationError::InvalidField {
                field,
                reason: format!("duplicate key '{}'", param.key),
            });
        }
    }
    Ok(())
}

fn check_payments(payments: &[Payment]) -> ValidationResult<()> {
    if payments.len() > u16::MAX as usize {
        return Err(ValidationError::InvalidField {
            field: "payments",
            reason: "too many entries".into(),
        });
    }
    for payment in payments {
        if payment.amount == 0 {
            return Err(ValidationError::NotPositive { field: "payment amount" });
        }
        if let Some(asset) = &payment.asset_id {
            check_short_text("payment asset_id", asset, false)?;
            Base58::parse_field("payment asset_id", asset)?;
        }
    }
    Ok(())
}
