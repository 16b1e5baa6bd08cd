//! Per-run provider state machine.

use std::fmt;

use thiserror::Error;

use crate::credentials::CredentialSource;
use crate::network::{NetworkProfile, NetworkRegistry, RegistryError};
use crate::provider::{NetworkProvider, ProviderError};

/// Where a deployment run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Idle,
    NetworkSelected,
    ProviderBuilding,
    ProviderReady,
    ProviderFailed,
}

impl DeploymentState {
    /// Ready and failed runs accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentState::ProviderReady | DeploymentState::ProviderFailed)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentState::Idle => "idle",
            DeploymentState::NetworkSelected => "network-selected",
            DeploymentState::ProviderBuilding => "provider-building",
            DeploymentState::ProviderReady => "provider-ready",
            DeploymentState::ProviderFailed => "provider-failed",
        };
        write!(f, "{}", name)
    }
}

/// Errors surfaced to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Operation not allowed in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: DeploymentState,
    },
}

/// Result type for deployment runs.
pub type DeploymentResult<T> = Result<T, DeploymentError>;

/// One deployment run against one network.
///
/// `Idle → NetworkSelected → ProviderBuilding → ProviderReady | ProviderFailed`
#[derive(Debug)]
pub struct Deployment<'r> {
    registry: &'r NetworkRegistry,
    state: DeploymentState,
    selected: Option<&'r NetworkProfile>,
    provider: Option<NetworkProvider>,
}

impl<'r> Deployment<'r> {
    pub fn new(registry: &'r NetworkRegistry) -> Self {
        Self {
            registry,
            state: DeploymentState::Idle,
            selected: None,
            provider: None,
        }
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    pub fn selected(&self) -> Option<&'r NetworkProfile> {
        self.selected
    }

    pub fn provider(&self) -> Option<&NetworkProvider> {
        self.provider.as_ref()
    }

    /// Pick the run's network. Only allowed once, from `Idle`.
    pub fn select(&mut self, name: &str) -> DeploymentResult<&'r NetworkProfile> {
        self.expect_state(DeploymentState::Idle, "select a network")?;

        match self.registry.resolve(name) {
            Ok(profile) => {
                tracing::info!(network = name, kind = %profile.kind(), "Network selected");
                self.selected = Some(profile);
                self.state = DeploymentState::NetworkSelected;
                Ok(profile)
            }
            Err(e) => {
                tracing::error!(network = name, error = %e, "Network selection failed");
                self.state = DeploymentState::ProviderFailed;
                Err(e.into())
            }
        }
    }

    /// Build the selected network's provider. Not retried on failure.
    pub fn build(&mut self, source: &dyn CredentialSource) -> DeploymentResult<&NetworkProvider> {
        self.expect_state(DeploymentState::NetworkSelected, "build a provider")?;
        let profile = self.selected.ok_or(DeploymentError::InvalidTransition {
            action: "build a provider",
            state: self.state,
        })?;

        self.state = DeploymentState::ProviderBuilding;
        match profile.factory().build(source) {
            Ok(provider) => {
                self.state = DeploymentState::ProviderReady;
                let provider = self.provider.insert(provider);
                Ok(&*provider)
            }
            Err(e) => {
                self.state = DeploymentState::ProviderFailed;
                Err(e.into())
            }
        }
    }

    /// Consume the run, yielding the provider if one was built.
    pub fn into_provider(self) -> Option<NetworkProvider> {
        self.provider
    }

    fn expect_state(&self, expected: DeploymentState, action: &'static str) -> DeploymentResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DeploymentError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ChainSelector;
    use crate::credentials::{MnemonicFileSource, NoCredentials};
    use crate::network::Transport;

    fn registry() -> NetworkRegistry {
        let mut registry = NetworkRegistry::new();
        registry
            .register(
                NetworkProfile::direct("development", Transport::new("127.0.0.1", 8545))
                    .with_chain(ChainSelector::Any),
            )
            .unwrap();
        registry
            .register(
                NetworkProfile::derived_key("ropsten")
                    .with_chain(ChainSelector::Id(3))
                    .with_wallet_file("/nonexistent/wallet.json"),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_happy_path() {
        let registry = registry();
        let mut run = Deployment::new(&registry);
        assert_eq!(run.state(), DeploymentState::Idle);

        run.select("development").unwrap();
        assert_eq!(run.state(), DeploymentState::NetworkSelected);

        let provider = run.build(&NoCredentials).unwrap();
        assert_eq!(provider.endpoint().as_str(), "http://127.0.0.1:8545/");
        assert_eq!(run.state(), DeploymentState::ProviderReady);
        assert!(run.state().is_terminal());
        assert!(run.into_provider().is_some());
    }

    #[test]
    fn test_unknown_network_fails_run() {
        let registry = registry();
        let mut run = Deployment::new(&registry);

        let err = run.select("mainnet").unwrap_err();
        assert_eq!(
            err,
            DeploymentError::Registry(RegistryError::UnknownNetwork("mainnet".to_string()))
        );
        assert_eq!(run.state(), DeploymentState::ProviderFailed);
        assert!(run.selected().is_none());
    }

    #[test]
    fn test_build_failure_is_terminal() {
        let registry = registry();
        let mut run = Deployment::new(&registry);
        run.select("ropsten").unwrap();

        let source = MnemonicFileSource::new("/nonexistent/wallet.json");
        let err = run.build(&source).unwrap_err();
        assert!(matches!(
            err,
            DeploymentError::Provider(ProviderError::CredentialUnavailable { .. })
        ));
        assert_eq!(run.state(), DeploymentState::ProviderFailed);

        // No automatic retry.
        let err = run.build(&source).unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidTransition { .. }));
        assert!(run.provider().is_none());
    }

    #[test]
    fn test_build_before_select() {
        let registry = registry();
        let mut run = Deployment::new(&registry);
        let err = run.build(&NoCredentials).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot build a provider while idle"
        );
        assert_eq!(run.state(), DeploymentState::Idle);
    }

    #[test]
    fn test_only_one_network_per_run() {
        let registry = registry();
        let mut run = Deployment::new(&registry);
        run.select("development").unwrap();
        assert!(run.select("ropsten").is_err());
        assert_eq!(run.selected().map(NetworkProfile::name), Some("development"));
    }
}
