//! Name → profile registry.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::DeployConfig;
use crate::network::profile::NetworkProfile;

/// Registry-level misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No profile registered under the requested name.
    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),

    /// A profile with this name is already registered.
    #[error("Network '{0}' is already registered")]
    DuplicateNetwork(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Ordered set of network profiles keyed by unique name.
///
/// Registration order is kept for listing; lookups go through the name index.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    profiles: Vec<NetworkProfile>,
    index: HashMap<String, usize>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every configured network in document order.
    pub fn from_config(config: &DeployConfig) -> RegistryResult<Self> {
        let mut registry = Self::new();
        for network in &config.networks {
            registry.register(NetworkProfile::from_config(network, &config.wallet_file))?;
        }

        tracing::info!(
            networks = ?registry.names().collect::<Vec<_>>(),
            "Network registry built"
        );

        Ok(registry)
    }

    /// Add a profile. Fails if its name is taken.
    pub fn register(&mut self, profile: NetworkProfile) -> RegistryResult<()> {
        if self.index.contains_key(profile.name()) {
            return Err(RegistryError::DuplicateNetwork(profile.name().to_string()));
        }

        tracing::debug!(
            network = profile.name(),
            kind = %profile.kind(),
            chain = %profile.chain(),
            "Network registered"
        );

        self.index.insert(profile.name().to_string(), self.profiles.len());
        self.profiles.push(profile);
        Ok(())
    }

    /// Look up the profile registered under `name`.
    pub fn resolve(&self, name: &str) -> RegistryResult<&NetworkProfile> {
        self.index
            .get(name)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| RegistryError::UnknownNetwork(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.iter()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(NetworkProfile::name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
