// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical actions and the key bindings that trigger them.
//!
//! Exact keys are configuration, not algorithm: navigators and scanners look
//! up an [`Action`] for each key event and never match physical keys directly.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::key::{Key, KeyChord, Modifiers};

/// A logical navigation action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Previous entry at the current level.
    Up,
    /// Next entry at the current level.
    Down,
    /// Enter the selected entry (or activate it when it has no children).
    Descend,
    /// Return to the parent level, or close at the top.
    Ascend,
    /// Move back by one page, clamped.
    PageUp,
    /// Move forward by one page, clamped.
    PageDown,
    /// First entry at the current level.
    First,
    /// Last entry at the current level.
    Last,
    /// Step the parent level backwards while staying at the current depth.
    PreviousCategory,
    /// Step the parent level forwards while staying at the current depth.
    NextCategory,
    /// Scanner: previous subcategory.
    PreviousSubcategory,
    /// Scanner: next subcategory.
    NextSubcategory,
    /// Scanner: previous group.
    PreviousGroup,
    /// Scanner: next group.
    NextGroup,
    /// Scanner: previous item.
    PreviousItem,
    /// Scanner: next item.
    NextItem,
    /// Scanner: move the reference cursor onto the selected item.
    MoveCursorToItem,
    /// Scanner: report distance and direction to the selected item.
    ReportDistance,
    /// Scanner: rebuild the catalog from fresh game data.
    Rescan,
    /// Close the overlay.
    Close,
    /// Remove the last type-ahead character.
    Backspace,
    /// Announce the current entry again.
    Repeat,
}

/// Mapping from key chords to actions.
///
/// Serialized as a table of chord strings to action names:
///
/// ```toml
/// "ctrl+pageup" = "previous_category"
/// "f5" = "rescan"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<KeyChord, Action>", into = "BTreeMap<KeyChord, Action>")]
pub struct KeyBindings {
    map: HashMap<KeyChord, Action>,
}

impl KeyBindings {
    /// An empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for hierarchical navigators (menus and object panels).
    pub fn navigator_defaults() -> Self {
        let none = Modifiers::empty();
        let mut b = Self::new();
        b.bind(KeyChord::new(Key::Up, none), Action::Up)
            .bind(KeyChord::new(Key::Down, none), Action::Down)
            .bind(KeyChord::new(Key::Right, none), Action::Descend)
            .bind(KeyChord::new(Key::Enter, none), Action::Descend)
            .bind(KeyChord::new(Key::Left, none), Action::Ascend)
            .bind(KeyChord::new(Key::Escape, none), Action::Ascend)
            .bind(KeyChord::new(Key::PageUp, none), Action::PageUp)
            .bind(KeyChord::new(Key::PageDown, none), Action::PageDown)
            .bind(KeyChord::new(Key::Home, none), Action::First)
            .bind(KeyChord::new(Key::End, none), Action::Last)
            .bind(
                KeyChord::new(Key::PageUp, Modifiers::CTRL),
                Action::PreviousCategory,
            )
            .bind(
                KeyChord::new(Key::PageDown, Modifiers::CTRL),
                Action::NextCategory,
            )
            .bind(KeyChord::new(Key::Backspace, none), Action::Backspace)
            .bind(KeyChord::new(Key::Tab, none), Action::Repeat);
        b
    }

    /// Defaults for the spatial scanner.
    pub fn scanner_defaults() -> Self {
        let none = Modifiers::empty();
        let mut b = Self::new();
        b.bind(
            KeyChord::new(Key::PageUp, Modifiers::CTRL),
            Action::PreviousCategory,
        )
        .bind(
            KeyChord::new(Key::PageDown, Modifiers::CTRL),
            Action::NextCategory,
        )
        .bind(
            KeyChord::new(Key::PageUp, Modifiers::SHIFT),
            Action::PreviousSubcategory,
        )
        .bind(
            KeyChord::new(Key::PageDown, Modifiers::SHIFT),
            Action::NextSubcategory,
        )
        .bind(
            KeyChord::new(Key::PageUp, Modifiers::ALT),
            Action::PreviousGroup,
        )
        .bind(KeyChord::new(Key::PageDown, Modifiers::ALT), Action::NextGroup)
        .bind(KeyChord::new(Key::PageUp, none), Action::PreviousItem)
        .bind(KeyChord::new(Key::PageDown, none), Action::NextItem)
        .bind(KeyChord::new(Key::Home, none), Action::MoveCursorToItem)
        .bind(KeyChord::new(Key::End, none), Action::ReportDistance)
        .bind(KeyChord::new(Key::Function(5), none), Action::Rescan)
        .bind(KeyChord::new(Key::Escape, none), Action::Close)
        .bind(KeyChord::new(Key::Backspace, none), Action::Backspace)
        .bind(KeyChord::new(Key::Tab, none), Action::Repeat);
        b
    }

    /// Bind `chord` to `action`, replacing any previous binding for the chord.
    pub fn bind(&mut self, chord: KeyChord, action: Action) -> &mut Self {
        self.map.insert(chord, action);
        self
    }

    /// Remove the binding for `chord`, returning the action it had.
    pub fn unbind(&mut self, chord: &KeyChord) -> Option<Action> {
        self.map.remove(chord)
    }

    /// Apply `overrides` on top of this table.
    pub fn merge(&mut self, overrides: &Self) -> &mut Self {
        for (chord, action) in &overrides.map {
            self.map.insert(*chord, *action);
        }
        self
    }

    /// Action bound to a delivered key event, if any.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<Action> {
        self.map
            .get(&KeyChord::from_event(key, modifiers))
            .copied()
    }

    /// Chords bound to `action`, in a stable order.
    pub fn chords_for(&self, action: Action) -> Vec<KeyChord> {
        let mut chords: Vec<KeyChord> = self
            .map
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(c, _)| *c)
            .collect();
        chords.sort();
        chords
    }

    /// Number of bound chords.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl From<BTreeMap<KeyChord, Action>> for KeyBindings {
    fn from(value: BTreeMap<KeyChord, Action>) -> Self {
        Self {
            map: value.into_iter().collect(),
        }
    }
}

impl From<KeyBindings> for BTreeMap<KeyChord, Action> {
    fn from(value: KeyBindings) -> Self {
        value.map.into_iter().collect()
    }
}
