// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physical keys, modifier sets, and key chords.
//!
//! A [`KeyChord`] is the unit the configuration surface binds actions to. It
//! parses from and prints to the `modifier+…+key` form used in config files:
//!
//! ```rust
//! use earshot_dispatch::{Key, KeyChord, Modifiers};
//!
//! let chord: KeyChord = "Ctrl+PageUp".parse().unwrap();
//! assert_eq!(chord, KeyChord::new(Key::PageUp, Modifiers::CTRL));
//! assert_eq!(chord.to_string(), "ctrl+pageup");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single physical key, as delivered by the input source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Home.
    Home,
    /// End.
    End,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Tab.
    Tab,
    /// Space bar.
    Space,
    /// A character key. Letters are stored as typed; matching is case-insensitive.
    Char(char),
    /// Function key `F1`..=`F24`.
    Function(u8),
}

impl Key {
    /// Whether this key is a navigation key.
    ///
    /// Navigation keys (arrows, page up/down, home/end, escape) clear any
    /// pending type-ahead buffer.
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::Up
                | Self::Down
                | Self::Left
                | Self::Right
                | Self::PageUp
                | Self::PageDown
                | Self::Home
                | Self::End
                | Self::Escape
        )
    }

    /// The alphabetic character carried by this key, if any.
    pub fn letter(self) -> Option<char> {
        match self {
            Self::Char(c) if c.is_alphabetic() => Some(c),
            _ => None,
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Enter => "enter",
            Self::Escape => "escape",
            Self::PageUp => "pageup",
            Self::PageDown => "pagedown",
            Self::Home => "home",
            Self::End => "end",
            Self::Backspace => "backspace",
            Self::Delete => "delete",
            Self::Tab => "tab",
            Self::Space => "space",
            Self::Char(_) | Self::Function(_) => return None,
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self) {
            (Some(name), _) => f.write_str(name),
            (None, Self::Char(c)) => {
                for lower in c.to_lowercase() {
                    write!(f, "{lower}")?;
                }
                Ok(())
            }
            (None, Self::Function(n)) => write!(f, "f{n}"),
            (None, _) => Ok(()),
        }
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "enter" | "return" => Self::Enter,
            "escape" | "esc" => Self::Escape,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "home" => Self::Home,
            "end" => Self::End,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "tab" => Self::Tab,
            "space" => Self::Space,
            "" => return Err(ParseKeyError::Empty),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    (Some('f'), Some(_)) => {
                        let n: u8 = other[1..]
                            .parse()
                            .map_err(|_| ParseKeyError::UnknownKey(s.to_owned()))?;
                        if !(1..=24).contains(&n) {
                            return Err(ParseKeyError::UnknownKey(s.to_owned()));
                        }
                        Self::Function(n)
                    }
                    _ => return Err(ParseKeyError::UnknownKey(s.to_owned())),
                }
            }
        };
        Ok(key)
    }
}

bitflags::bitflags! {
    /// Modifier keys held while a key was pressed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Modifiers: u8 {
        /// Either shift key.
        const SHIFT = 0b0000_0001;
        /// Either control key.
        const CTRL  = 0b0000_0010;
        /// Either alt / option key.
        const ALT   = 0b0000_0100;
        /// Either meta / super / command key.
        const META  = 0b0000_1000;
    }
}

impl Modifiers {
    /// Whether a chord with these modifiers can still be typed text.
    ///
    /// Shift alone keeps text semantics; control, alt and meta turn a letter
    /// into a command.
    pub const fn is_text(self) -> bool {
        !self.intersects(Self::CTRL.union(Self::ALT).union(Self::META))
    }
}

/// Error returned when a key or key chord string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseKeyError {
    /// The string was empty or only contained modifiers.
    #[error("key chord is empty")]
    Empty,
    /// The key part was not recognized.
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    /// A modifier part was not recognized.
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
}

/// A key together with the modifiers held when it was pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord {
    /// The physical key.
    pub key: Key,
    /// Modifiers held with the key.
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Create a chord from a key and modifier set.
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a chord with no modifiers.
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Normalize character keys to lowercase so `Shift+A` and `shift+a` bind alike.
    fn normalized(self) -> Self {
        match self.key {
            Key::Char(c) => {
                let mut lower = c.to_lowercase();
                match (lower.next(), lower.next()) {
                    (Some(l), None) => Self::new(Key::Char(l), self.modifiers),
                    _ => self,
                }
            }
            _ => self,
        }
    }

    /// Chord for a delivered key event, normalized for binding lookup.
    pub fn from_event(key: Key, modifiers: Modifiers) -> Self {
        Self::new(key, modifiers).normalized()
    }
}

impl From<Key> for KeyChord {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "ctrl"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
            (Modifiers::META, "meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyChord {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseKeyError::Empty);
        }
        if trimmed == "+" {
            return Ok(Self::plain(Key::Char('+')));
        }
        // A trailing `+` is the plus key itself, e.g. `shift++`.
        let (head, key_part) = match trimmed.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match trimmed.rsplit_once('+') {
                Some((rest, key)) => (rest, key),
                None => ("", trimmed),
            },
        };
        let mut modifiers = Modifiers::empty();
        for part in head.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.trim().to_ascii_lowercase().as_str() {
                "shift" => Modifiers::SHIFT,
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "option" => Modifiers::ALT,
                "meta" | "super" | "cmd" => Modifiers::META,
                _ => return Err(ParseKeyError::UnknownModifier(part.to_owned())),
            };
        }
        let key: Key = key_part.parse()?;
        Ok(Self::new(key, modifiers).normalized())
    }
}

impl TryFrom<String> for KeyChord {
    type Error = ParseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyChord> for String {
    fn from(value: KeyChord) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_keys_are_classified() {
        for key in [
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
            Key::PageUp,
            Key::PageDown,
            Key::Home,
            Key::End,
            Key::Escape,
        ] {
            assert!(key.is_navigation(), "{key} should be a navigation key");
        }
        for key in [Key::Enter, Key::Backspace, Key::Tab, Key::Char('a')] {
            assert!(!key.is_navigation(), "{key} should not be a navigation key");
        }
    }

    #[test]
    fn letter_only_reports_alphabetic_chars() {
        assert_eq!(Key::Char('w').letter(), Some('w'));
        assert_eq!(Key::Char('W').letter(), Some('W'));
        assert_eq!(Key::Char('7').letter(), None);
        assert_eq!(Key::Enter.letter(), None);
    }

    #[test]
    fn parses_modifier_chords() {
        let chord: KeyChord = "ctrl+shift+PageDown".parse().unwrap();
        assert_eq!(chord.key, Key::PageDown);
        assert_eq!(chord.modifiers, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(chord.to_string(), "ctrl+shift+pagedown");
    }

    #[test]
    fn parses_function_and_char_keys() {
        assert_eq!("F5".parse::<Key>(), Ok(Key::Function(5)));
        assert_eq!("q".parse::<Key>(), Ok(Key::Char('q')));
        assert_eq!("shift++".parse::<KeyChord>().unwrap().key, Key::Char('+'));
        assert!("f25".parse::<Key>().is_err());
        assert!("hyper+a".parse::<KeyChord>().is_err());
        assert_eq!("".parse::<KeyChord>(), Err(ParseKeyError::Empty));
    }

    #[test]
    fn bare_plus_is_the_plus_key() {
        let plus: KeyChord = "+".parse().unwrap();
        assert_eq!(plus, KeyChord::plain(Key::Char('+')));
        assert_eq!(plus.to_string(), "+");
        assert_eq!(plus.to_string().parse::<KeyChord>(), Ok(plus));
        let shifted: KeyChord = "shift++".parse().unwrap();
        assert_eq!(shifted.to_string().parse::<KeyChord>(), Ok(shifted));
    }

    #[test]
    fn character_chords_normalize_case() {
        let typed = KeyChord::from_event(Key::Char('A'), Modifiers::SHIFT);
        let configured: KeyChord = "shift+a".parse().unwrap();
        assert_eq!(typed, configured);
    }

    #[test]
    fn text_modifiers() {
        assert!(Modifiers::empty().is_text());
        assert!(Modifiers::SHIFT.is_text());
        assert!(!Modifiers::CTRL.is_text());
        assert!(!(Modifiers::SHIFT | Modifiers::ALT).is_text());
    }
}
