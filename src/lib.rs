//! Deployment network resolver.
//!
//! Maps a named deployment target to the transport and signing mechanism a
//! deployment driver uses to submit transactions: a node with unlocked
//! accounts, keys derived from a mnemonic file, or (observationally) a
//! custodial wallet service.
//!
//! ```rust,ignore
//! let config = deploy_resolver::config::load_config(Path::new("networks.toml"))?;
//! let registry = NetworkRegistry::from_config(&config)?;
//! let provider = deploy_resolver::deployment::resolve_provider(&registry, "ropsten")?;
//! ```

pub mod config;
pub mod credentials;
pub mod deployment;
pub mod discovery;
pub mod network;
pub mod observability;
pub mod provider;

pub use config::DeployConfig;
pub use deployment::{Deployment, DeploymentError};
pub use network::{NetworkProfile, NetworkRegistry};
pub use provider::{NetworkProvider, ProviderFactory};
