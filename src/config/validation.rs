//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check each network carries the fields its provider kind needs
//! - Validate value ranges (ports valid, derivation window non-empty)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployConfig → Result<(), Vec<ValidationError>>
//! - Duplicate network names are left to the registry, which owns uniqueness

use thiserror::Error;
use url::Url;

use crate::config::schema::{DeployConfig, NetworkConfig, ProviderKind};
use crate::network::Transport;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, network) in config.networks.iter().enumerate() {
        validate_network(i, network, &mut errors);
    }

    if config.custodial.enabled && Url::parse(&config.custodial.base_url).is_err() {
        errors.push(ValidationError::new(
            "custodial.base_url",
            format!("'{}' is not a valid URL", config.custodial.base_url),
        ));
    }

    if config.custodial.timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "custodial.timeout_secs",
            "must be greater than zero when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_network(index: usize, network: &NetworkConfig, errors: &mut Vec<ValidationError>) {
    let prefix = if network.name.is_empty() {
        format!("networks[{}]", index)
    } else {
        format!("networks.{}", network.name)
    };

    if network.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.name", prefix), "must not be empty"));
    }

    match network.provider {
        ProviderKind::Direct => {
            match network.host.as_deref() {
                None | Some("") => {
                    errors.push(ValidationError::new(
                        format!("{}.host", prefix),
                        "required for direct networks",
                    ));
                }
                Some(host) if Transport::new(host, 1).url().is_err() => {
                    errors.push(ValidationError::new(
                        format!("{}.host", prefix),
                        format!("'{}' is not a valid host", host),
                    ));
                }
                Some(_) => {}
            }
            match network.port {
                None => errors.push(ValidationError::new(
                    format!("{}.port", prefix),
                    "required for direct networks",
                )),
                Some(0) => errors.push(ValidationError::new(
                    format!("{}.port", prefix),
                    "must be between 1 and 65535",
                )),
                Some(_) => {}
            }
        }
        ProviderKind::DerivedKey => {
            if network.num_addresses == 0 {
                errors.push(ValidationError::new(
                    format!("{}.num_addresses", prefix),
                    "must derive at least one address",
                ));
            }
            if network.address_index.checked_add(network.num_addresses).is_none() {
                errors.push(ValidationError::new(
                    format!("{}.address_index", prefix),
                    "derivation window overflows",
                ));
            }
        }
        ProviderKind::Custodial => {}
    }
}
