//! Network profiles: how to reach and sign for one deployment target.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::schema::{ChainSelector, NetworkConfig, ProviderKind};
use crate::provider::ProviderFactory;

/// Host/port of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub host: String,
    pub port: u16,
}

impl Transport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// HTTP JSON-RPC endpoint for this transport.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}", self))
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets in an authority.
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Range of HD addresses derived from a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationWindow {
    /// First address index on `m/44'/60'/0'/0/{index}`.
    pub index: u32,
    /// Number of consecutive addresses.
    pub count: u32,
}

impl Default for DerivationWindow {
    fn default() -> Self {
        Self { index: 0, count: 1 }
    }
}

/// Immutable description of one deployment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    name: String,
    kind: ProviderKind,
    transport: Option<Transport>,
    chain: ChainSelector,
    gas_price: Option<u128>,
    wallet_file: Option<PathBuf>,
    derivation: DerivationWindow,
}

impl NetworkProfile {
    fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transport: None,
            chain: ChainSelector::Any,
            gas_price: None,
            wallet_file: None,
            derivation: DerivationWindow::default(),
        }
    }

    /// A node with unlocked accounts reached over host/port.
    pub fn direct(name: impl Into<String>, transport: Transport) -> Self {
        let mut profile = Self::new(name, ProviderKind::Direct);
        profile.transport = Some(transport);
        profile
    }

    /// Keys derived from the mnemonic in a wallet file.
    pub fn derived_key(name: impl Into<String>) -> Self {
        Self::new(name, ProviderKind::DerivedKey)
    }

    /// Keys held by a custodial service.
    pub fn custodial(name: impl Into<String>) -> Self {
        Self::new(name, ProviderKind::Custodial)
    }

    pub fn with_chain(mut self, chain: ChainSelector) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_wallet_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.wallet_file = Some(path.into());
        self
    }

    pub fn with_derivation(mut self, index: u32, count: u32) -> Self {
        self.derivation = DerivationWindow { index, count };
        self
    }

    /// Build a profile from its config entry.
    ///
    /// Derived-key networks without their own `wallet_file` inherit
    /// `default_wallet`.
    pub fn from_config(network: &NetworkConfig, default_wallet: &Path) -> Self {
        let mut profile = Self::new(network.name.clone(), network.provider)
            .with_chain(network.network_id)
            .with_derivation(network.address_index, network.num_addresses);

        if let (Some(host), Some(port)) = (&network.host, network.port) {
            profile.transport = Some(Transport::new(host.clone(), port));
        }
        if let Some(gas_price) = network.gas_price {
            profile.gas_price = Some(u128::from(gas_price));
        }
        if network.provider == ProviderKind::DerivedKey {
            profile.wallet_file = Some(
                network
                    .wallet_file
                    .clone()
                    .unwrap_or_else(|| default_wallet.to_path_buf()),
            );
        }
        profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub fn chain(&self) -> ChainSelector {
        self.chain
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    /// Mnemonic file holding this network's credentials.
    pub fn wallet_file(&self) -> Option<&Path> {
        self.wallet_file.as_deref()
    }

    pub fn derivation(&self) -> DerivationWindow {
        self.derivation
    }

    /// Deferred provider construction for this network.
    ///
    /// Creating the factory does no work; nothing is read or derived until
    /// [`ProviderFactory::build`] runs.
    pub fn factory(&self) -> ProviderFactory {
        ProviderFactory::new(self.clone())
    }
}
