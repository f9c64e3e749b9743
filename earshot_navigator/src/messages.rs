// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixed phrases, overridable through serde.

use serde::{Deserialize, Serialize};

/// Fixed phrases spoken by navigators and scanners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Spoken for a level with no entries.
    pub empty: String,
    /// Spoken when type-ahead finds nothing.
    pub no_match: String,
    /// Spoken when an entry or its data cannot be read.
    pub unavailable: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            empty: String::from("empty"),
            no_match: String::from("no match"),
            unavailable: String::from("not available"),
        }
    }
}
