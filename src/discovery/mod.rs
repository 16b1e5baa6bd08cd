//! Custodial account discovery.
//!
//! # Data Flow
//! ```text
//! driver (opt-in)
//!     → AccountDiscovery::spawn (own tokio task)
//!     → CustodialClient::connect → list_accounts
//!     → Discovered | DiscoveryFailed (logged, returned)
//!     → join_discovery (bounded wait, aborted when still pending)
//! ```
//!
//! Nothing here feeds provider construction. A failed or hung discovery never
//! blocks resolving or building a provider.

pub mod accounts;

pub use accounts::{join_discovery, AccountDiscovery, DiscoveryOutcome, DISCOVERY_JOIN_WAIT};
