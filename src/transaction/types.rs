//! Transaction data model and validation errors.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum size of deployable bytecode (scripts and contracts).
pub const MAX_BYTECODE_SIZE: usize = 160 * 1024;

/// Errors raised while assembling a transaction, before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Bytecode exceeds the deployable limit.
    #[error("Bytecode size {size} bytes exceeds maximum {max} bytes")]
    BytecodeTooLarge { size: usize, max: usize },

    /// Bytecode payload is empty.
    #[error("Bytecode must not be empty")]
    EmptyBytecode,

    /// A numeric field that must be positive was zero.
    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    /// A string field failed base58 decoding.
    #[error("{field} is not valid base58: '{value}'")]
    InvalidBase58 { field: &'static str, value: String },

    /// A field is malformed for another reason.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Result type for transaction assembly.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Implements `Serialize`/`Deserialize` as a base58 string through `Display`/`FromStr`.
macro_rules! base58_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Variable-length identifier rendered as base58 (addresses, asset and contract ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Base58(Vec<u8>);

impl Base58 {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse `value`, naming `field` in the error.
    pub fn parse_field(field: &'static str, value: &str) -> ValidationResult<Self> {
        value.parse().map_err(|_| ValidationError::InvalidBase58 {
            field,
            value: value.to_string(),
        })
    }
}

impl From<Vec<u8>> for Base58 {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl FromStr for Base58 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("invalid base58: {}", e))?;
        if bytes.is_empty() {
            return Err("empty value".to_string());
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Base58 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

base58_serde!(Base58);

/// 32-byte ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl FromStr for PublicKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("invalid base58 public key: {}", e))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("public key must be 32 bytes, got {}", b.len()))?;
        Ok(Self(key))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

base58_serde!(PublicKey);

/// Transaction identifier: SHA-256 of the canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

impl FromStr for TxId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("invalid base58 transaction id: {}", e))?;
        let id: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("transaction id must be 32 bytes, got {}", b.len()))?;
        Ok(Self(id))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

base58_serde!(TxId);

/// Opaque signature attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof(Vec<u8>);

impl Proof {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Proof {
    type Err = bs58::decode::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(bs58::decode(s).into_vec()?))
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

base58_serde!(Proof);

/// Operation kind, with its on-chain type number and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    Issue,
    Transfer,
    Data,
    SetScript,
    CreateContract,
    CallContract,
    UpdateContract,
}

impl TxKind {
    pub fn type_id(self) -> u8 {
        match self {
            TxKind::Issue => 3,
            TxKind::Transfer => 4,
            TxKind::Data => 12,
            TxKind::SetScript => 13,
            TxKind::CreateContract => 103,
            TxKind::CallContract => 104,
            TxKind::UpdateContract => 107,
        }
    }

    pub fn version(self) -> u8 {
        match self {
            TxKind::Issue | TxKind::Transfer | TxKind::Data => 3,
            TxKind::SetScript => 1,
            TxKind::CreateContract | TxKind::CallContract => 7,
            TxKind::UpdateContract => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Issue => "issue",
            TxKind::Transfer => "transfer",
            TxKind::Data => "data",
            TxKind::SetScript => "set_script",
            TxKind::CreateContract => "create_contract",
            TxKind::CallContract => "call_contract",
            TxKind::UpdateContract => "update_contract",
        }
    }

    /// Whether the network reports a separate execution outcome for this kind.
    pub fn is_contract_execution(self) -> bool {
        matches!(
            self,
            TxKind::CreateContract | TxKind::CallContract | TxKind::UpdateContract
        )
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed value of a contract parameter or data entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Integer(i64),
    Boolean(bool),
    Binary(Vec<u8>),
    String(String),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Integer(_) => "integer",
            ParamValue::Boolean(_) => "boolean",
            ParamValue::Binary(_) => "binary",
            ParamValue::String(_) => "string",
        }
    }
}

/// Keyed, typed parameter: `{"type": "integer", "key": "quorum", "value": 3}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParam", into = "RawParam")]
pub struct ContractParam {
    pub key: String,
    pub value: ParamValue,
}

impl ContractParam {
    pub fn integer(key: impl Into<String>, value: i64) -> Self {
        Self { key: key.into(), value: ParamValue::Integer(value) }
    }

    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self { key: key.into(), value: ParamValue::Boolean(value) }
    }

    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into(), value: ParamValue::Binary(value.into()) }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: ParamValue::String(value.into()) }
    }
}

const BASE64_PREFIX: &str = "base64:";

#[derive(Serialize, Deserialize)]
struct RawParam {
    #[serde(rename = "type")]
    kind: String,
    key: String,
    value: serde_json::Value,
}

impl From<ContractParam> for RawParam {
    fn from(param: ContractParam) -> Self {
        let kind = param.value.type_name().to_string();
        let value = match param.value {
            ParamValue::Integer(v) => serde_json::Value::from(v),
            ParamValue::Boolean(v) => serde_json::Value::from(v),
            ParamValue::Binary(v) => {
                serde_json::Value::from(format!("{}{}", BASE64_PREFIX, STANDARD.encode(v)))
            }
            ParamValue::String(v) => serde_json::Value::from(v),
        };
        Self { kind, key: param.key, value }
    }
}

impl TryFrom<RawParam> for ContractParam {
    type Error = String;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        let mismatch = || format!("value of '{}' does not match type '{}'", raw.key, raw.kind);
        let value = match raw.kind.as_str() {
            "integer" => ParamValue::Integer(raw.value.as_i64().ok_or_else(mismatch)?),
            "boolean" => ParamValue::Boolean(raw.value.as_bool().ok_or_else(mismatch)?),
            "string" => ParamValue::String(raw.value.as_str().ok_or_else(mismatch)?.to_string()),
            "binary" => {
                let text = raw.value.as_str().ok_or_else(mismatch)?;
                let encoded = text.strip_prefix(BASE64_PREFIX).unwrap_or(text);
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| format!("invalid base64 in '{}': {}", raw.key, e))?;
                ParamValue::Binary(bytes)
            }
            other => return Err(format!("unknown parameter type '{}'", other)),
        };
        Ok(Self { key: raw.key, value })
    }
}

/// Attached payment for contract creation or calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    pub amount: u64,
}

impl Payment {
    pub fn native(amount: u64) -> Self {
        Self { asset_id: None, amount }
    }
}

// Operation parameters, as supplied by callers.

#[derive(Debug, Clone, Default)]
pub struct TransferParams {
    pub recipient: String,
    pub amount: u64,
    pub asset_id: Option<String>,
    pub attachment: String,
    pub fee: Option<u64>,
    pub fee_asset_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DataParams {
    pub entries: Vec<ContractParam>,
    pub fee: Option<u64>,
    pub fee_asset_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IssueParams {
    pub name: String,
    pub description: String,
    pub quantity: u64,
    pub decimals: u8,
    pub reissuable: bool,
    pub fee: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SetScriptParams {
    /// Compiled script bytes.
    pub script: Vec<u8>,
    pub fee: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateContractParams {
    pub contract_name: String,
    pub bytecode: Vec<u8>,
    pub params: Vec<ContractParam>,
    pub payments: Vec<Payment>,
    pub validation_policy: ValidationPolicy,
    pub fee: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContractParams {
    pub contract_id: String,
    pub bytecode: Vec<u8>,
    pub validation_policy: ValidationPolicy,
    pub fee: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CallContractParams {
    pub contract_id: String,
    pub contract_version: u32,
    pub function: String,
    pub params: Vec<ContractParam>,
    pub payments: Vec<Payment>,
    pub fee: Option<u64>,
    pub fee_asset_id: Option<String>,
}

/// A typed operation to be turned into a transaction.
#[derive(Debug, Clone)]
pub enum Operation {
    Transfer(TransferParams),
    Data(DataParams),
    Issue(IssueParams),
    SetScript(SetScriptParams),
    CreateContract(CreateContractParams),
    UpdateContract(UpdateContractParams),
    CallContract(CallContractParams),
}

impl Operation {
    pub fn kind(&self) -> TxKind {
        match self {
            Operation::Transfer(_) => TxKind::Transfer,
            Operation::Data(_) => TxKind::Data,
            Operation::Issue(_) => TxKind::Issue,
            Operation::SetScript(_) => TxKind::SetScript,
            Operation::CreateContract(_) => TxKind::CreateContract,
            Operation::UpdateContract(_) => TxKind::UpdateContract,
            Operation::CallContract(_) => TxKind::CallContract,
        }
    }

    /// Caller-supplied fee, if any.
    pub fn explicit_fee(&self) -> Option<u64> {
        match self {
            Operation::Transfer(p) => p.fee,
            Operation::Data(p) => p.fee,
            Operation::Issue(p) => p.fee,
            Operation::SetScript(p) => p.fee,
            Operation::CreateContract(p) => p.fee,
            Operation::UpdateContract(p) => p.fee,
            Operation::CallContract(p) => p.fee,
        }
    }

    pub fn fee_asset_id(&self) -> Option<&str> {
        match self {
            Operation::Transfer(p) => p.fee_asset_id.as_deref(),
            Operation::Data(p) => p.fee_asset_id.as_deref(),
            Operation::CallContract(p) => p.fee_asset_id.as_deref(),
            _ => None,
        }
    }
}

// Validated transaction bodies, as signed and broadcast.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferBody {
    pub recipient: Base58,
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<Base58>,
    /// Raw attachment bytes, base58 on the wire.
    pub attachment: Base58,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBody {
    pub data: Vec<ContractParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueBody {
    pub chain_id: u8,
    pub name: String,
    pub description: String,
    pub quantity: u64,
    pub decimals: u8,
    pub reissuable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScriptBody {
    pub chain_id: u8,
    #[serde(serialize_with = "serialize_base64")]
    pub script: Vec<u8>,
}

/// Bytecode with its SHA-256 hash (hex), as stored by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContract {
    #[serde(serialize_with = "serialize_base64_plain")]
    pub bytecode: Vec<u8>,
    pub bytecode_hash: String,
}

/// Which endorsements the network requires for contract results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Any,
    Majority,
}

impl ValidationPolicy {
    pub fn code(self) -> u8 {
        match self {
            ValidationPolicy::Any => 0,
            ValidationPolicy::Majority => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractBody {
    pub contract_name: String,
    pub stored_contract: StoredContract,
    pub params: Vec<ContractParam>,
    pub payments: Vec<Payment>,
    pub validation_policy: ValidationPolicy,
    pub is_confidential: bool,
    pub group_owners: Vec<String>,
    pub group_participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractBody {
    pub contract_id: Base58,
    pub stored_contract: StoredContract,
    pub validation_policy: ValidationPolicy,
    pub group_owners: Vec<String>,
    pub group_participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContractBody {
    pub contract_id: Base58,
    pub contract_version: u32,
    pub contract_engine: String,
    pub call_func: String,
    pub params: Vec<ContractParam>,
    pub payments: Vec<Payment>,
}

/// Kind-specific part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TxBody {
    Transfer(TransferBody),
    Data(DataBody),
    Issue(IssueBody),
    SetScript(SetScriptBody),
    CreateContract(CreateContractBody),
    UpdateContract(UpdateContractBody),
    CallContract(CallContractBody),
}

impl TxBody {
    pub fn kind(&self) -> TxKind {
        match self {
            TxBody::Transfer(_) => TxKind::Transfer,
            TxBody::Data(_) => TxKind::Data,
            TxBody::Issue(_) => TxKind::Issue,
            TxBody::SetScript(_) => TxKind::SetScript,
            TxBody::CreateContract(_) => TxKind::CreateContract,
            TxBody::UpdateContract(_) => TxKind::UpdateContract,
            TxBody::CallContract(_) => TxKind::CallContract,
        }
    }
}

/// Fully assembled transaction awaiting signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub sender_public_key: PublicKey,
    pub fee: u64,
    pub fee_asset_id: Option<Base58>,
    pub timestamp: u64,
    pub body: TxBody,
}

impl UnsignedTransaction {
    pub fn kind(&self) -> TxKind {
        self.body.kind()
    }
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{}{}", BASE64_PREFIX, STANDARD.encode(bytes)))
}

fn serialize_base64_plain<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contract_param_wire_format() {
        let params = vec![
            ContractParam::string("publicKeys", "abc__def"),
            ContractParam::integer("quorum", 3),
            ContractParam::boolean("paused", false),
            ContractParam::binary("blob", vec![1u8, 2, 3]),
        ];

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!([
                {"type": "string", "key": "publicKeys", "value": "abc__def"},
                {"type": "integer", "key": "quorum", "value": 3},
                {"type": "boolean", "key": "paused", "value": false},
                {"type": "binary", "key": "blob", "value": "base64:AQID"},
            ])
        );

        let decoded: Vec<ContractParam> = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_contract_param_type_mismatch() {
        let raw = json!({"type": "integer", "key": "quorum", "value": "three"});
        let err = serde_json::from_value::<ContractParam>(raw).unwrap_err();
        assert!(err.to_string().contains("does not match type 'integer'"));
    }

    #[test]
    fn test_public_key_parsing() {
        let encoded = bs58::encode([7u8; 32]).into_string();
        let key: PublicKey = encoded.parse().unwrap();
        assert_eq!(key.0, [7u8; 32]);
        assert_eq!(key.to_string(), encoded);

        let short = bs58::encode([7u8; 16]).into_string();
        let err = short.parse::<PublicKey>().unwrap_err();
        assert!(err.contains("32 bytes"));
    }

    #[test]
    fn test_base58_rejects_invalid_and_empty() {
        assert!(Base58::parse_field("recipient", "3Mxyz0OIl").is_err());
        assert!("".parse::<Base58>().is_err());
        let err = Base58::parse_field("recipient", "not base58!").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidBase58 { field: "recipient", value: "not base58!".into() }
        );
    }

    #[test]
    fn test_kind_numbers() {
        assert_eq!(TxKind::Transfer.type_id(), 4);
        assert_eq!(TxKind::CallContract.type_id(), 104);
        assert_eq!(TxKind::UpdateContract.version(), 6);
        assert!(TxKind::CreateContract.is_contract_execution());
        assert!(!TxKind::Transfer.is_contract_execution());
    }
}
