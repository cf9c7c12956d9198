//! Contract deployer CLI.
//!
//! ```text
//! deployer --config deployer.toml --network testnet transfer --recipient <addr> --amount 100000000
//! deployer --config deployer.toml --network testnet deploy --bytecode contract.wasm --name counter
//! deployer --config deployer.toml --network testnet status --tx-id <id>
//! ```
//!
//! Signing commands read the sender key from `DEPLOYER_PRIVATE_KEY`.
//! Results are printed to stdout as pretty JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use contract_deployer::config::{load_config, ConfigError};
use contract_deployer::contract::ContractReader;
use contract_deployer::node::{NodeApi, NodeClient, NodeError};
use contract_deployer::observability::init_logging;
use contract_deployer::proofs::{KeypairSigner, ProofError};
use contract_deployer::tracking::Tracker;
use contract_deployer::transaction::{
    CallContractParams, ContractParam, CreateContractParams, DataParams, IssueParams,
    SetScriptParams, TransferParams, TxId, UpdateContractParams, ValidationPolicy,
};
use contract_deployer::{DeployError, Deployer, TrackingMode};

#[derive(Parser)]
#[command(name = "deployer")]
#[command(about = "Submit and track transactions on a permissioned network", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "DEPLOYER_CONFIG", default_value = "deployer.toml")]
    config: PathBuf,

    /// Network section to use.
    #[arg(short, long, env = "DEPLOYER_NETWORK")]
    network: String,

    /// Sender account has a script attached.
    #[arg(long)]
    scripted: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer tokens
    Transfer {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        asset_id: Option<String>,
        #[arg(long, default_value = "")]
        attachment: String,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Write data entries to the sender's account
    Data {
        /// Entry as `type:key=value` (integer, boolean, string, binary as base64)
        #[arg(long = "entry", required = true)]
        entries: Vec<String>,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Issue a new asset
    Issue {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        quantity: u64,
        #[arg(long, default_value_t = 8)]
        decimals: u8,
        #[arg(long)]
        reissuable: bool,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Call a contract function
    Invoke {
        #[arg(long)]
        contract_id: String,
        #[arg(long, default_value_t = 1)]
        contract_version: u32,
        #[arg(long)]
        function: String,
        /// Parameter as `type:key=value`
        #[arg(long = "param")]
        params: Vec<String>,
        /// Require majority endorsement of execution results
        #[arg(long)]
        majority: bool,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Attach a compiled script to the sender's account
    SetScript {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Deploy a contract from compiled bytecode
    Deploy {
        #[arg(long)]
        bytecode: PathBuf,
        #[arg(long)]
        name: String,
        /// Init parameter as `type:key=value`
        #[arg(long = "param")]
        params: Vec<String>,
        /// Require majority endorsement of execution results
        #[arg(long)]
        majority: bool,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Replace a contract's bytecode
    Update {
        #[arg(long)]
        contract_id: String,
        #[arg(long)]
        bytecode: PathBuf,
        /// Require majority endorsement of execution results
        #[arg(long)]
        majority: bool,
        #[arg(long)]
        fee: Option<u64>,
    },
    /// Read a contract state entry
    Value {
        #[arg(long)]
        contract_id: String,
        #[arg(long)]
        key: String,
    },
    /// Show contract metadata
    Info {
        #[arg(long)]
        contract_id: String,
    },
    /// Wait for an already broadcast transaction
    Status {
        #[arg(long)]
        tx_id: String,
        /// Also wait for the contract execution result
        #[arg(long)]
        execution: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("Invalid argument: {0}")]
    Input(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            CliError::Config(_) => "config",
            CliError::Node(_) => "node",
            CliError::Proof(_) => "proof",
            CliError::Deploy(e) => e.kind().as_str(),
            CliError::Input(_) => "input",
            CliError::Io { .. } => "io",
            CliError::Output(_) => "output",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Command failed");
            eprintln!("Error ({}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.config)?;
    if let Err(e) = init_logging(&config.observability) {
        eprintln!("warning: logging not initialized: {}", e);
    }

    let network = config.network(&cli.network)?;
    let node: Arc<dyn NodeApi> = Arc::new(NodeClient::new(&network)?);

    tracing::info!(
        network = %network.name,
        node_api = %network.node_api,
        chain_id = network.chain_id,
        "Configuration loaded"
    );

    let deployer = || -> Result<Deployer, CliError> {
        let signer = Arc::new(KeypairSigner::from_env()?);
        Ok(Deployer::new(Arc::clone(&network), Arc::clone(&node), signer, &config.tracker)
            .scripted_sender(cli.scripted))
    };

    match cli.command {
        Commands::Transfer { recipient, amount, asset_id, attachment, fee } => {
            let outcome = deployer()?
                .transfer(TransferParams {
                    recipient,
                    amount,
                    asset_id,
                    attachment,
                    fee,
                    fee_asset_id: None,
                })
                .await?;
            print_json(&outcome)
        }
        Commands::Data { entries, fee } => {
            let entries = parse_params(&entries)?;
            let outcome = deployer()?
                .data(DataParams { entries, fee, fee_asset_id: None })
                .await?;
            print_json(&outcome)
        }
        Commands::Issue { name, description, quantity, decimals, reissuable, fee } => {
            let outcome = deployer()?
                .issue(IssueParams { name, description, quantity, decimals, reissuable, fee })
                .await?;
            print_json(&outcome)
        }
        Commands::Invoke { contract_id, contract_version, function, params, fee } => {
            let params = parse_params(&params)?;
            let outcome = deployer()?
                .invoke(CallContractParams {
                    contract_id,
                    contract_version,
                    function,
                    params,
                    payments: Vec::new(),
                    fee,
                    fee_asset_id: None,
                })
                .await?;
            print_json(&outcome)
        }
        Commands::SetScript { script, fee } => {
            let script = read_file(&script).await?;
            let outcome = deployer()?
                .set_script(SetScriptParams { script, fee })
                .await?;
            print_json(&outcome)
        }
        Commands::Deploy { bytecode, name, params, majority, fee } => {
            let params = parse_params(&params)?;
            let outcome = deployer()?
                .deploy_contract_from_file(
                    &bytecode,
                    CreateContractParams {
                        contract_name: name,
                        params,
                        validation_policy: validation_policy(majority),
                        fee,
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&outcome)
        }
        Commands::Update { contract_id, bytecode, majority, fee } => {
            let outcome = deployer()?
                .update_contract_from_file(
                    &bytecode,
                    UpdateContractParams {
                        contract_id,
                        validation_policy: validation_policy(majority),
                        fee,
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&outcome)
        }
        Commands::Value { contract_id, key } => {
            let value = ContractReader::new(Arc::clone(&node)).value(&contract_id, &key).await?;
            print_json(&value)
        }
        Commands::Info { contract_id } => {
            let info = ContractReader::new(Arc::clone(&node)).info(&contract_id).await?;
            print_json(&info)
        }
        Commands::Status { tx_id, execution } => {
            let id: TxId = tx_id.parse().map_err(CliError::Input)?;
            let mode = if execution {
                TrackingMode::ExecutionAware
            } else {
                TrackingMode::InclusionOnly
            };
            let tracker = Tracker::new(Arc::clone(&node), &network, &config.tracker);
            let outcome = tracker.track(&id, mode).await.map_err(DeployError::from)?;
            print_json(&outcome)
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Vec<ContractParam>, CliError> {
    raw.iter().map(|entry| parse_param(entry)).collect()
}

fn validation_policy(majority: bool) -> ValidationPolicy {
    if majority {
        ValidationPolicy::Majority
    } else {
        ValidationPolicy::Any
    }
}

/// Parse `type:key=value`.
fn parse_param(raw: &str) -> Result<ContractParam, CliError> {
    let invalid = |reason: &str| CliError::Input(format!("'{}': {}", raw, reason));

    let (kind, rest) = raw.split_once(':').ok_or_else(|| invalid("expected type:key=value"))?;
    let (key, value) = rest.split_once('=').ok_or_else(|| invalid("expected type:key=value"))?;
    if key.is_empty() {
        return Err(invalid("empty key"));
    }

    match kind {
        "integer" => value
            .parse()
            .map(|v| ContractParam::integer(key, v))
            .map_err(|_| invalid("not an integer")),
        "boolean" => value
            .parse()
            .map(|v| ContractParam::boolean(key, v))
            .map_err(|_| invalid("not a boolean")),
        "string" => Ok(ContractParam::string(key, value)),
        "binary" => STANDARD
            .decode(value.strip_prefix("base64:").unwrap_or(value))
            .map(|v| ContractParam::binary(key, v))
            .map_err(|_| invalid("not base64")),
        _ => Err(invalid("unknown type")),
    }
}
