//! Credential sources.
//!
//! # Data Flow
//! ```text
//! wallet.json ──▶ mnemonic_file.rs (read once, on first use) ──▶ ProviderFactory
//!
//! API key/secret ──▶ custodial.rs (HTTP, async) ──▶ discovery (observational only)
//! ```
//!
//! # Security Constraints
//! - Mnemonics and API secrets are never logged
//! - Sources do no I/O until first asked for credentials

pub mod custodial;
pub mod mnemonic_file;

use std::path::PathBuf;

use thiserror::Error;

use crate::network::NetworkProfile;

pub use custodial::{AccountSet, CustodialClient, CustodialCredentials, CustodialError};
pub use mnemonic_file::{DerivedKeyCredentials, MnemonicFileSource, WalletFile};

/// Errors raised while loading signing material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The source file could not be read.
    #[error("Credential source {path} not found: {reason}")]
    SourceNotFound { path: PathBuf, reason: String },

    /// The source was read but could not be parsed.
    #[error("Malformed credential source {path}: {reason}")]
    MalformedSource { path: PathBuf, reason: String },

    /// The source has no credentials for this network.
    #[error("Credentials for network '{network}' unavailable: {reason}")]
    CredentialUnavailable { network: String, reason: String },
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Where derived-key signing material comes from.
///
/// The custodial service is not a source here: it only lists accounts, on the
/// discovery track (see [`crate::discovery`]).
pub trait CredentialSource: Send + Sync {
    /// Mnemonic and transport descriptor for `network`.
    fn mnemonic_credentials(&self, network: &str) -> CredentialResult<DerivedKeyCredentials>;
}

/// A source with nothing in it. Direct networks need no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn mnemonic_credentials(&self, network: &str) -> CredentialResult<DerivedKeyCredentials> {
        Err(CredentialError::CredentialUnavailable {
            network: network.to_string(),
            reason: "no credential source configured".to_string(),
        })
    }
}

/// The credential source a profile points at, without reading it.
pub fn source_for_profile(profile: &NetworkProfile) -> Box<dyn CredentialSource> {
    match profile.wallet_file() {
        Some(path) => Box::new(MnemonicFileSource::new(path)),
        None => Box::new(NoCredentials),
    }
}
