// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data seam between a navigator and the game.

use crate::provider::Unavailable;

/// Hierarchical data behind a [`HierarchicalNavigator`](crate::HierarchicalNavigator).
///
/// Entries are addressed by *paths*: `&[]` is the root, `&[2]` is the third
/// top-level entry, `&[2, 0]` is its first child, and so on. Counts and names
/// are read from whatever [`refresh`](Self::refresh) last loaded; a source must
/// not call into the game outside of `refresh` and `activate`.
pub trait NavigatorSource {
    /// Load fresh data. Called once per interaction session.
    fn refresh(&mut self) -> Result<(), Unavailable>;

    /// Number of children under `path` (top-level entries for `&[]`).
    fn item_count(&self, path: &[usize]) -> usize;

    /// Name of the entry at `path`, used for type-ahead.
    fn item_name(&self, path: &[usize]) -> Option<String>;

    /// Spoken description of the entry at `path`.
    fn describe(&self, path: &[usize]) -> Option<String> {
        self.item_name(path)
    }

    /// Whether the entry at `path` can be entered, even if it has no children yet.
    fn has_children(&self, path: &[usize]) -> bool {
        self.item_count(path) > 0
    }

    /// Act on the entry at `path` when it cannot be entered.
    ///
    /// Returns an utterance to speak, if any.
    fn activate(&mut self, path: &[usize]) -> Option<String> {
        let _ = path;
        None
    }

    /// Drop loaded data.
    fn clear(&mut self) {}
}
