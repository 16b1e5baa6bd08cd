//! Configuration schema definitions.
//!
//! This module defines the registry document read by the deployment driver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration for the resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Default mnemonic file for derived-key networks.
    pub wallet_file: PathBuf,

    /// Network definitions, in document order.
    pub networks: Vec<NetworkConfig>,

    /// Compiler pins, passed through untouched.
    pub compilers: CompilersConfig,

    /// Custodial wallet service settings.
    pub custodial: CustodialConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            wallet_file: PathBuf::from("wallet.json"),
            networks: Vec::new(),
            compilers: CompilersConfig::default(),
            custodial: CustodialConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl DeployConfig {
    /// The pinned solc version, if any.
    pub fn compiler_version(&self) -> Option<&str> {
        self.compilers.solc.as_ref().map(|solc| solc.version.as_str())
    }
}

/// Signing strategy of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Unlocked accounts on a node reached over host/port.
    Direct,
    /// Keys derived from a mnemonic read from a wallet file.
    DerivedKey,
    /// Keys held by a remote custodial service.
    Custodial,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Direct => write!(f, "direct"),
            ProviderKind::DerivedKey => write!(f, "derived_key"),
            ProviderKind::Custodial => write!(f, "custodial"),
        }
    }
}

/// Chain id a network accepts: a concrete id or `"*"` for any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "RawChainSelector", into = "RawChainSelector")]
pub enum ChainSelector {
    Any,
    Id(u64),
}

impl ChainSelector {
    /// The concrete chain id, `None` for the wildcard.
    pub fn id(&self) -> Option<u64> {
        match self {
            ChainSelector::Any => None,
            ChainSelector::Id(id) => Some(*id),
        }
    }

    /// Whether a chain id reported by a node is acceptable.
    pub fn accepts(&self, chain_id: u64) -> bool {
        match self {
            ChainSelector::Any => true,
            ChainSelector::Id(id) => *id == chain_id,
        }
    }
}

impl Default for ChainSelector {
    fn default() -> Self {
        ChainSelector::Any
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSelector::Any => write!(f, "*"),
            ChainSelector::Id(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum RawChainSelector {
    Id(u64),
    Text(String),
}

impl TryFrom<RawChainSelector> for ChainSelector {
    type Error = String;

    fn try_from(raw: RawChainSelector) -> Result<Self, Self::Error> {
        match raw {
            RawChainSelector::Id(id) => Ok(ChainSelector::Id(id)),
            RawChainSelector::Text(text) if text.trim() == "*" => Ok(ChainSelector::Any),
            RawChainSelector::Text(text) => text
                .trim()
                .parse::<u64>()
                .map(ChainSelector::Id)
                .map_err(|_| format!("invalid network_id '{}': expected an integer or \"*\"", text)),
        }
    }
}

impl From<ChainSelector> for RawChainSelector {
    fn from(chain: ChainSelector) -> Self {
        match chain {
            ChainSelector::Any => RawChainSelector::Text("*".to_string()),
            ChainSelector::Id(id) => RawChainSelector::Id(id),
        }
    }
}

/// One deployment target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Unique network name (e.g., "development", "ropsten").
    pub name: String,

    /// Signing strategy.
    pub provider: ProviderKind,

    /// Node host for direct networks.
    #[serde(default)]
    pub host: Option<String>,

    /// Node port for direct networks.
    #[serde(default)]
    pub port: Option<u16>,

    /// Chain id or "*".
    #[serde(default)]
    pub network_id: ChainSelector,

    /// Gas price override in wei.
    #[serde(default)]
    pub gas_price: Option<u64>,

    /// Mnemonic file override for derived-key networks.
    #[serde(default)]
    pub wallet_file: Option<PathBuf>,

    /// First HD address index to derive.
    #[serde(default)]
    pub address_index: u32,

    /// Number of HD addresses to derive (default: 1).
    #[serde(default = "default_num_addresses")]
    pub num_addresses: u32,
}

fn default_num_addresses() -> u32 {
    1
}

/// Compiler pins.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilersConfig {
    pub solc: Option<SolcConfig>,
}

/// Solidity compiler pin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolcConfig {
    pub version: String,
}

/// Custodial wallet service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CustodialConfig {
    /// Run account discovery when the driver asks for it.
    pub enabled: bool,

    /// Service base URL.
    pub base_url: String,

    /// Request timeout in seconds. Unset means no bound.
    pub timeout_secs: Option<u64>,
}

impl Default for CustodialConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.coinbase.com".to_string(),
            timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
