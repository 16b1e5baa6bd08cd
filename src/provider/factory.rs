//! Deferred, per-network provider construction.
//!
//! # Responsibilities
//! - Dispatch on the profile's provider kind
//! - Pull credentials from the supplied source (derived-key only)
//! - Build an alloy provider bound to the right endpoint
//!
//! Nothing happens until [`ProviderFactory::build`] is called, so profiles
//! that are never selected never read credentials or derive keys.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder};
use url::Url;

use crate::config::schema::ProviderKind;
use crate::credentials::CredentialSource;
use crate::network::NetworkProfile;
use crate::observability::metrics;
use crate::provider::derivation::{self, DerivationError};
use crate::provider::types::{NetworkProvider, ProviderError, ProviderResult};

/// Builds exactly one provider for the profile it was created from.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    profile: NetworkProfile,
}

impl ProviderFactory {
    pub(crate) fn new(profile: NetworkProfile) -> Self {
        Self { profile }
    }

    /// Construct the provider, consuming the factory.
    ///
    /// `source` is only consulted for derived-key networks.
    pub fn build(self, source: &dyn CredentialSource) -> ProviderResult<NetworkProvider> {
        let kind = self.profile.kind();
        let result = match kind {
            ProviderKind::Direct => self.build_direct(),
            ProviderKind::DerivedKey => self.build_derived_key(source),
            ProviderKind::Custodial => Err(ProviderError::CustodialSignerUnsupported(
                self.profile.name().to_string(),
            )),
        };

        metrics::record_provider_build(kind, result.is_ok());

        match &result {
            Ok(provider) => tracing::info!(
                network = provider.network(),
                kind = %kind,
                endpoint = %provider.endpoint(),
                chain = %provider.chain(),
                signers = provider.signer_addresses().len(),
                "Provider ready"
            ),
            Err(e) => tracing::error!(
                network = self.profile.name(),
                kind = %kind,
                error = %e,
                "Provider construction failed"
            ),
        }

        result
    }

    fn build_direct(&self) -> ProviderResult<NetworkProvider> {
        let name = self.profile.name();
        let transport = self.profile.transport().ok_or_else(|| ProviderError::InvalidTransport {
            network: name.to_string(),
            reason: "direct networks need a host and port".to_string(),
        })?;
        let endpoint = transport.url().map_err(|e| ProviderError::InvalidTransport {
            network: name.to_string(),
            reason: format!("'{}': {}", transport, e),
        })?;

        let inner = ProviderBuilder::new().connect_http(endpoint.clone());
        Ok(self.finish(endpoint, Vec::new(), Arc::new(inner)))
    }

    fn build_derived_key(&self, source: &dyn CredentialSource) -> ProviderResult<NetworkProvider> {
        let name = self.profile.name();
        let credentials = source
            .mnemonic_credentials(name)
            .map_err(|e| ProviderError::from_credential(name, e))?;

        let endpoint = Url::parse(credentials.transport()).map_err(|e| {
            ProviderError::InvalidTransport {
                network: name.to_string(),
                reason: format!("'{}': {}", credentials.transport(), e),
            }
        })?;

        let signers = derivation::derive_signers(
            credentials.mnemonic(),
            self.profile.derivation(),
            self.profile.chain().id(),
        )
        .map_err(|e| invalid_mnemonic(name, e))?;

        let addresses = derivation::addresses(&signers);
        let mut signers = signers.into_iter();
        let first = signers.next().ok_or_else(|| {
            invalid_mnemonic(name, DerivationError::Invalid("no addresses derived".to_string()))
        })?;

        let mut wallet = EthereumWallet::from(first);
        for signer in signers {
            wallet.register_signer(signer);
        }

        let inner = ProviderBuilder::new().wallet(wallet).connect_http(endpoint.clone());
        Ok(self.finish(endpoint, addresses, Arc::new(inner)))
    }

    fn finish(
        &self,
        endpoint: Url,
        signers: Vec<alloy::primitives::Address>,
        inner: Arc<dyn Provider + Send + Sync>,
    ) -> NetworkProvider {
        NetworkProvider {
            network: self.profile.name().to_string(),
            kind: self.profile.kind(),
            endpoint,
            chain: self.profile.chain(),
            gas_price: self.profile.gas_price(),
            signers,
            inner,
        }
    }
}

fn invalid_mnemonic(network: &str, err: DerivationError) -> ProviderError {
    ProviderError::InvalidMnemonic {
        network: network.to_string(),
        reason: err.to_string(),
    }
}
