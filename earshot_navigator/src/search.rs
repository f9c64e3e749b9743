// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type-ahead search buffer and prefix matching.

use earshot_dispatch::Key;

/// Accumulates typed letters for jump-to-item search.
///
/// The buffer is stored case-folded. It is cleared by navigation keys, never
/// by a timer. Matching is left to [`first_prefix_match`] so each navigator
/// decides which names are searched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeAheadSearch {
    buffer: String,
    revision: u64,
}

impl TypeAheadSearch {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `c`, case-folded.
    pub fn add_char(&mut self, c: char) {
        self.buffer.extend(c.to_lowercase());
        self.touch();
    }

    /// Remove the last character. Returns `false` if the buffer was already empty.
    pub fn pop_char(&mut self) -> bool {
        let popped = self.buffer.pop().is_some();
        if popped {
            self.touch();
        }
        popped
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        if !self.buffer.is_empty() {
            self.buffer.clear();
            self.touch();
        }
    }

    /// Clear the buffer if `key` is a navigation key. Returns whether it was cleared.
    pub fn clear_on_navigation_key(&mut self, key: Key) -> bool {
        if key.is_navigation() && self.has_buffer() {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Whether any characters are buffered.
    pub fn has_buffer(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// The buffered, case-folded prefix.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Bumped on every change to the buffer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Lowest index in `0..count` whose name starts with `prefix`, ignoring case.
///
/// An empty prefix matches nothing. Entries without a name never match.
///
/// ```rust
/// use earshot_navigator::first_prefix_match;
///
/// let names = ["Stone", "Wood", "Wheat", "wool"];
/// let name_of = |i: usize| names.get(i).map(|s| s.to_string());
/// assert_eq!(first_prefix_match("w", names.len(), name_of), Some(1));
/// assert_eq!(first_prefix_match("WH", names.len(), name_of), Some(2));
/// assert_eq!(first_prefix_match("x", names.len(), name_of), None);
/// ```
pub fn first_prefix_match(
    prefix: &str,
    count: usize,
    mut name_of: impl FnMut(usize) -> Option<String>,
) -> Option<usize> {
    if prefix.is_empty() {
        return None;
    }
    let prefix = prefix.to_lowercase();
    (0..count).find(|&i| name_of(i).is_some_and(|name| name.to_lowercase().starts_with(&prefix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_case_folded() {
        let mut search = TypeAheadSearch::new();
        search.add_char('W');
        search.add_char('o');
        assert_eq!(search.buffer(), "wo");
        assert!(search.has_buffer());
    }

    #[test]
    fn navigation_keys_clear_other_keys_do_not() {
        let mut search = TypeAheadSearch::new();
        search.add_char('s');
        assert!(!search.clear_on_navigation_key(Key::Enter));
        assert!(!search.clear_on_navigation_key(Key::Char('t')));
        assert_eq!(search.buffer(), "s");
        assert!(search.clear_on_navigation_key(Key::PageDown));
        assert!(!search.has_buffer());
        assert!(!search.clear_on_navigation_key(Key::Up));
    }

    #[test]
    fn pop_and_revision() {
        let mut search = TypeAheadSearch::new();
        assert!(!search.pop_char());
        assert_eq!(search.revision(), 0);
        search.add_char('a');
        search.add_char('b');
        assert!(search.pop_char());
        assert_eq!(search.buffer(), "a");
        assert_eq!(search.revision(), 3);
        search.clear();
        search.clear();
        assert_eq!(search.revision(), 4);
    }

    #[test]
    fn unnamed_entries_never_match() {
        let names = [None, Some("Wood")];
        let found = first_prefix_match("w", 2, |i| names[i].map(str::to_owned));
        assert_eq!(found, Some(1));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn match_is_lowest_case_insensitive_prefix(
                names in prop::collection::vec("[a-cA-C]{0,4}", 0..12),
                prefix in "[a-cA-C]{1,2}",
            ) {
                let found = first_prefix_match(&prefix, names.len(), |i| names.get(i).cloned());
                let lower = prefix.to_lowercase();
                let expected = names.iter().position(|n| n.to_lowercase().starts_with(&lower));
                prop_assert_eq!(found, expected);
            }
        }
    }
}
