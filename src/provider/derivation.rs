//! HD key derivation from a BIP-39 mnemonic.
//!
//! Keys are derived on `m/44'/60'/0'/0/{index}` with the English wordlist.
//!
//! # Security
//! - The phrase is never logged
//! - Only derived addresses leave this module in log events

use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use alloy::signers::Signer;
use thiserror::Error;

use crate::network::DerivationWindow;

/// Word counts BIP-39 allows.
const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Why a phrase could not be turned into keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// Not 12, 15, 18, 21 or 24 words.
    #[error("expected 12, 15, 18, 21 or 24 words, got {0}")]
    WordCount(usize),
    /// Unknown word, bad checksum or path error.
    #[error("{0}")]
    Invalid(String),
}

/// Normalize whitespace in a phrase and check its word count.
pub fn normalize_phrase(phrase: &str) -> Result<String, DerivationError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if !VALID_WORD_COUNTS.contains(&words.len()) {
        return Err(DerivationError::WordCount(words.len()));
    }
    Ok(words.join(" "))
}

/// Derive `window.count` signers starting at `window.index`.
///
/// Every signer carries `chain_id` for EIP-155 replay protection when one is
/// given.
pub fn derive_signers(
    phrase: &str,
    window: DerivationWindow,
    chain_id: Option<u64>,
) -> Result<Vec<PrivateKeySigner>, DerivationError> {
    let phrase = normalize_phrase(phrase)?;
    let end = window
        .index
        .checked_add(window.count)
        .ok_or_else(|| DerivationError::Invalid("derivation window overflows".to_string()))?;

    (window.index..end)
        .map(|index| {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase.as_str())
                .index(index)
                .and_then(|builder| builder.build())
                .map_err(|e| DerivationError::Invalid(e.to_string()))?;
            Ok(signer.with_chain_id(chain_id))
        })
        .collect()
}

/// Addresses of a set of signers, in derivation order.
pub fn addresses(signers: &[PrivateKeySigner]) -> Vec<Address> {
    signers.iter().map(|signer| signer.address()).collect()
}
