// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot-prefixed errors with stable codes.

use std::path::PathBuf;

use earshot_dispatch::ChainError;
use thiserror::Error;

/// Shared `Result` alias for the umbrella crate.
pub type Result<T> = std::result::Result<T, EarshotError>;

/// Startup-time failures: configuration and chain construction.
///
/// Nothing that happens while keys are dispatched or events are announced
/// surfaces here; those paths contain their own faults.
#[derive(Debug, Error)]
pub enum EarshotError {
    /// A configuration value is out of range.
    #[error("[EARSHOT-1001] invalid configuration: {details}")]
    InvalidConfig {
        /// What was wrong.
        details: String,
    },

    /// An explicitly named configuration file does not exist.
    #[error("[EARSHOT-1002] missing configuration file: {}", path.display())]
    MissingConfig {
        /// The path that was asked for.
        path: PathBuf,
    },

    /// The configuration text could not be parsed.
    #[error("[EARSHOT-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        /// Format or section being parsed.
        context: &'static str,
        /// Parser message.
        details: String,
    },

    /// Reading the configuration file failed.
    #[error("[EARSHOT-1004] IO failure at {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The handler priority list could not be resolved.
    #[error("[EARSHOT-1101] dispatch chain: {0}")]
    Chain(#[from] ChainError),
}

impl EarshotError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "EARSHOT-1001",
            Self::MissingConfig { .. } => "EARSHOT-1002",
            Self::ConfigParse { .. } => "EARSHOT-1003",
            Self::Io { .. } => "EARSHOT-1004",
            Self::Chain(_) => "EARSHOT-1101",
        }
    }
}

impl From<toml::de::Error> for EarshotError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
