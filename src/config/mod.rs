//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! networks.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DeployConfig (validated, immutable)
//!     → NetworkRegistry::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a deployment run sees one snapshot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Compiler pins are carried, never interpreted

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ChainSelector, CustodialConfig, DeployConfig, NetworkConfig, ObservabilityConfig,
    ProviderKind,
};
