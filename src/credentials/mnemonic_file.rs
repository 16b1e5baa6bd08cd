//! Mnemonic wallet files.
//!
//! A wallet file is a JSON object holding, per derived-key network,
//! `<network>_mnemonics` (the seed phrase) and `<network>_provider` (the RPC
//! endpoint the derived keys sign for).
//!
//! # Security
//! - Phrases are never logged
//! - `Debug` output redacts the phrase

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::credentials::{CredentialError, CredentialResult, CredentialSource};

const MNEMONIC_SUFFIX: &str = "_mnemonics";
const PROVIDER_SUFFIX: &str = "_provider";

/// Signing material for one derived-key network.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKeyCredentials {
    mnemonic: String,
    transport: String,
}

impl DerivedKeyCredentials {
    pub fn new(mnemonic: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            transport: transport.into(),
        }
    }

    /// The seed phrase.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// The RPC endpoint descriptor.
    pub fn transport(&self) -> &str {
        &self.transport
    }
}

impl fmt::Debug for DerivedKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeyCredentials")
            .field("mnemonic", &"[REDACTED]")
            .field("transport", &self.transport)
            .finish()
    }
}

/// A parsed wallet file.
#[derive(Clone)]
pub struct WalletFile {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl WalletFile {
    /// Read and parse a wallet file.
    pub fn load(path: &Path) -> CredentialResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CredentialError::SourceNotFound {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            },
            _ => CredentialError::SourceNotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let wallet = Self::parse(path, &content)?;
        tracing::debug!(path = %path.display(), keys = wallet.entries.len(), "Wallet file loaded");
        Ok(wallet)
    }

    /// Parse wallet file content; `path` is only used for error reporting.
    pub fn parse(path: &Path, content: &str) -> CredentialResult<Self> {
        let malformed = |reason: String| CredentialError::MalformedSource {
            path: path.to_path_buf(),
            reason,
        };

        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(entries)) => Ok(Self {
                path: path.to_path_buf(),
                entries,
            }),
            Ok(_) => Err(malformed("expected a JSON object".to_string())),
            Err(e) => Err(malformed(e.to_string())),
        }
    }

    /// Credentials for `network`, from `<network>_mnemonics` and `<network>_provider`.
    pub fn credentials(&self, network: &str) -> CredentialResult<DerivedKeyCredentials> {
        let mnemonic = self.string_field(network, &format!("{}{}", network, MNEMONIC_SUFFIX))?;
        let transport = self.string_field(network, &format!("{}{}", network, PROVIDER_SUFFIX))?;
        Ok(DerivedKeyCredentials::new(mnemonic, transport))
    }

    fn string_field(&self, network: &str, key: &str) -> CredentialResult<String> {
        match self.entries.get(key) {
            None | Some(Value::Null) => Err(CredentialError::CredentialUnavailable {
                network: network.to_string(),
                reason: format!("'{}' missing from {}", key, self.path.display()),
            }),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(CredentialError::CredentialUnavailable {
                    network: network.to_string(),
                    reason: format!("'{}' is empty in {}", key, self.path.display()),
                })
            }
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(_) => Err(CredentialError::MalformedSource {
                path: self.path.clone(),
                reason: format!("'{}' must be a string", key),
            }),
        }
    }
}

impl fmt::Debug for WalletFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletFile")
            .field("path", &self.path)
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialSource for WalletFile {
    fn mnemonic_credentials(&self, network: &str) -> CredentialResult<DerivedKeyCredentials> {
        self.credentials(network)
    }
}

/// A wallet file that is read on first use and at most once.
///
/// Constructing the source does no I/O.
#[derive(Debug)]
pub struct MnemonicFileSource {
    path: PathBuf,
    loaded: OnceLock<CredentialResult<WalletFile>>,
}

impl MnemonicFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been read.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn wallet(&self) -> CredentialResult<&WalletFile> {
        self.loaded
            .get_or_init(|| WalletFile::load(&self.path))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl CredentialSource for MnemonicFileSource {
    fn mnemonic_credentials(&self, network: &str) -> CredentialResult<DerivedKeyCredentials> {
        self.wallet()?.credentials(network)
    }
}
