//! Indexer configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How to handle a `StakeBurned` event for an address with no wallet record.
///
/// The upstream contract should never emit such a burn, but the behavior when
/// it does is a deployment decision, not something to resolve silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownWalletBurns {
    /// Get-or-create: an empty wallet is created and then debited (subject
    /// to the underflow clamp). Mirrors the original deployment.
    #[default]
    CreateEmpty,
    /// Strict-load like the claim handler: log an error, ignore the event.
    Skip,
}

/// Configuration for the event reducer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    #[serde(default)]
    pub unknown_wallet_burns: UnknownWalletBurns,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl IndexerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
