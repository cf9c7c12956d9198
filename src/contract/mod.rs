//! Contract state queries.
//!
//! Read-only helpers over [`crate::node::NodeApi`]; nothing here signs or
//! broadcasts.

pub mod reader;

pub use reader::ContractReader;
