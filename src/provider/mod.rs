//! Provider resolution subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkProfile::factory()
//!     → factory.rs (deferred; dispatch on ProviderKind)
//!         Direct      → http://host:port, node-managed accounts
//!         DerivedKey  → CredentialSource → derivation.rs → wallet-filling provider
//!         Custodial   → CustodialSignerUnsupported
//!     → types.rs (NetworkProvider handed to the driver)
//! ```
//!
//! # Design Decisions
//! - A factory is consumed by `build`; one factory yields one provider
//! - Credential errors surface synchronously to the caller of `build`
//! - No retries: a failed build is final for the run

pub mod derivation;
pub mod factory;
pub mod types;

pub use factory::ProviderFactory;
pub use types::{NetworkProvider, ProviderError, ProviderResult};
