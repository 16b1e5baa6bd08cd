//! Provider handle and error definitions.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ChainSelector, ProviderKind};
use crate::credentials::CredentialError;

/// Errors that can occur while building or probing a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The network's signing material could not be found.
    #[error("Credentials for network '{network}' unavailable: {reason}")]
    CredentialUnavailable { network: String, reason: String },

    /// The credential source exists but could not be parsed.
    #[error("Malformed credential source {path}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    /// The mnemonic failed word-count or checksum validation.
    #[error("Invalid mnemonic for network '{network}': {reason}")]
    InvalidMnemonic { network: String, reason: String },

    /// Host/port or transport descriptor is not a usable endpoint.
    #[error("Invalid transport for network '{network}': {reason}")]
    InvalidTransport { network: String, reason: String },

    /// Custodial accounts are not wired into any signer.
    #[error("Network '{0}' uses a custodial signer, which cannot back a provider")]
    CustodialSignerUnsupported(String),

    /// RPC request against the node failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Node reports a different chain than the profile expects.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl ProviderError {
    /// Map a credential-load failure for `network` into the provider taxonomy.
    ///
    /// A missing source is reported the same way as missing fields.
    pub fn from_credential(network: &str, err: CredentialError) -> Self {
        match err {
            CredentialError::SourceNotFound { path, reason } => ProviderError::CredentialUnavailable {
                network: network.to_string(),
                reason: format!("{}: {}", path.display(), reason),
            },
            CredentialError::CredentialUnavailable { network, reason } => {
                ProviderError::CredentialUnavailable { network, reason }
            }
            CredentialError::MalformedSource { path, reason } => {
                ProviderError::MalformedSource { path, reason }
            }
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A ready-to-use transaction provider for one network.
#[derive(Clone)]
pub struct NetworkProvider {
    pub(crate) network: String,
    pub(crate) kind: ProviderKind,
    pub(crate) endpoint: Url,
    pub(crate) chain: ChainSelector,
    pub(crate) gas_price: Option<u128>,
    pub(crate) signers: Vec<Address>,
    pub(crate) inner: Arc<dyn Provider + Send + Sync>,
}

impl NetworkProvider {
    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// JSON-RPC endpoint the provider talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn chain(&self) -> ChainSelector {
        self.chain
    }

    /// Gas price override in wei, applied by the driver to every transaction.
    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    /// Locally derived signer addresses. Empty for direct networks, whose
    /// accounts live on the node.
    pub fn signer_addresses(&self) -> &[Address] {
        &self.signers
    }

    /// The underlying alloy provider.
    pub fn provider(&self) -> &(dyn Provider + Send + Sync) {
        self.inner.as_ref()
    }

    /// Accounts that can sign on this network.
    ///
    /// Derived-key networks report their derived addresses without a network
    /// call; direct networks ask the node for its unlocked accounts.
    pub async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        match self.kind {
            ProviderKind::DerivedKey => Ok(self.signers.clone()),
            _ => self
                .inner
                .get_accounts()
                .await
                .map_err(|e| ProviderError::Rpc(e.to_string())),
        }
    }

    /// Query the node's chain id and check it against the profile.
    pub async fn verify_chain_id(&self) -> ProviderResult<u64> {
        let actual = self
            .inner
            .get_chain_id()
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;

        match self.chain.id() {
            Some(expected) if !self.chain.accepts(actual) => {
                Err(ProviderError::ChainMismatch { expected, actual })
            }
            _ => Ok(actual),
        }
    }
}

impl std::fmt::Debug for NetworkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkProvider")
            .field("network", &self.network)
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint.as_str())
            .field("chain", &self.chain)
            .field("gas_price", &self.gas_price)
            .field("signers", &self.signers)
            .finish()
    }
}
