//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DeployerConfig (validated, immutable)
//!     → network(name) selects one NetworkConfig
//!     → shared via Arc with every pipeline stage
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no process-wide singleton
//! - Network sections have no defaults: every field must be given explicitly
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::DeployerConfig;
pub use schema::FeeSchedule;
pub use schema::NetworkConfig;
pub use schema::ObservabilityConfig;
pub use schema::TrackerConfig;
