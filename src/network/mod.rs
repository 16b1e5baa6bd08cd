//! Network registry subsystem.
//!
//! # Data Flow
//! ```text
//! DeployConfig.networks
//!     → profile.rs (NetworkProfile per entry)
//!     → registry.rs (unique names, registration order kept)
//!     → resolve(name) → NetworkProfile → factory()
//! ```
//!
//! # Design Decisions
//! - Profiles are immutable once registered
//! - Resolution never falls back to a default network
//! - Registering a profile never touches its credentials

pub mod profile;
pub mod registry;

pub use profile::{DerivationWindow, NetworkProfile, Transport};
pub use registry::{NetworkRegistry, RegistryError, RegistryResult};
