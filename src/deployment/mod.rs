//! Deployment run lifecycle.
//!
//! # Data Flow
//! ```text
//! driver: select(name) ──▶ NetworkRegistry::resolve
//!         build(source) ──▶ NetworkProfile::factory().build(source)
//!                       ──▶ ProviderReady(NetworkProvider) | ProviderFailed
//! ```
//!
//! # Design Decisions
//! - Exactly one network per run
//! - Terminal states are final; the driver starts a new run to try again
//! - Account discovery is a separate track and is never awaited here

pub mod session;

pub use session::{Deployment, DeploymentError, DeploymentResult, DeploymentState};

use crate::credentials::source_for_profile;
use crate::network::NetworkRegistry;
use crate::provider::NetworkProvider;

/// Select `name` and build its provider with the credential source the
/// profile points at.
pub fn resolve_provider(registry: &NetworkRegistry, name: &str) -> DeploymentResult<NetworkProvider> {
    let mut run = Deployment::new(registry);
    let profile = run.select(name)?;
    let source = source_for_profile(profile);
    run.build(source.as_ref())?;
    run.into_provider().ok_or(DeploymentError::InvalidTransition {
        action: "take the provider",
        state: DeploymentState::ProviderFailed,
    })
}
