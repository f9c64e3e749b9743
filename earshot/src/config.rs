// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TOML configuration with validation.
//!
//! Every section is optional: an empty file yields [`EarshotConfig::default`].
//! Binding tables are overrides merged on top of the built-in defaults.

use std::fs;
use std::path::Path;

use earshot_announce::{DedupConfig, Speaker};
use earshot_dispatch::KeyBindings;
use earshot_navigator::{DEFAULT_PAGE_SIZE, HierarchicalNavigator, Messages, NavigatorSource};
use earshot_scanner::{ScanSource, SpatialScanner};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::{EarshotError, Result};

/// Default distance unit spoken by scanners.
pub const DEFAULT_DISTANCE_UNIT: &str = "tiles";

/// Full configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarshotConfig {
    /// Handler names in dispatch order; unlisted handlers follow in
    /// registration order.
    pub priority: Vec<String>,
    /// Entries moved by PageUp and PageDown in navigators.
    pub page_size: usize,
    /// Unit word in scanner distance reports.
    pub distance_unit: String,
    /// Announcer grace period and cache size.
    pub announce: DedupConfig,
    /// Fixed phrases.
    pub messages: Messages,
    /// Key binding overrides.
    pub bindings: BindingOverrides,
}

/// Per-component key binding overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingOverrides {
    /// Merged over [`KeyBindings::navigator_defaults`].
    pub navigator: KeyBindings,
    /// Merged over [`KeyBindings::scanner_defaults`].
    pub scanner: KeyBindings,
}

impl Default for EarshotConfig {
    fn default() -> Self {
        Self {
            priority: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            distance_unit: DEFAULT_DISTANCE_UNIT.to_owned(),
            announce: DedupConfig::default(),
            messages: Messages::default(),
            bindings: BindingOverrides::default(),
        }
    }
}

impl EarshotConfig {
    /// Read, parse and validate the file at `path`.
    ///
    /// A missing file is an error: callers that want defaults should not ask
    /// for a file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EarshotError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| EarshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(cfg)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges and the priority list.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(EarshotError::InvalidConfig {
                details: "page_size must be at least 1".to_owned(),
            });
        }
        if self.announce.capacity == 0 {
            return Err(EarshotError::InvalidConfig {
                details: "announce.capacity must be at least 1".to_owned(),
            });
        }
        let mut seen = HashSet::new();
        for name in &self.priority {
            if name.trim().is_empty() {
                return Err(EarshotError::InvalidConfig {
                    details: "priority entries must not be blank".to_owned(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(EarshotError::InvalidConfig {
                    details: format!("priority lists `{name}` more than once"),
                });
            }
        }
        Ok(())
    }

    /// Navigator defaults with the configured overrides applied.
    pub fn navigator_bindings(&self) -> KeyBindings {
        let mut bindings = KeyBindings::navigator_defaults();
        bindings.merge(&self.bindings.navigator);
        bindings
    }

    /// Scanner defaults with the configured overrides applied.
    pub fn scanner_bindings(&self) -> KeyBindings {
        let mut bindings = KeyBindings::scanner_defaults();
        bindings.merge(&self.bindings.scanner);
        bindings
    }

    /// A navigator set up with this configuration's bindings, phrases and page size.
    pub fn navigator<S: NavigatorSource>(
        &self,
        name: impl Into<String>,
        source: S,
        levels: usize,
        speaker: Speaker,
    ) -> HierarchicalNavigator<S> {
        HierarchicalNavigator::new(name, source, levels, speaker)
            .with_bindings(self.navigator_bindings())
            .with_messages(self.messages.clone())
            .with_page_size(self.page_size)
    }

    /// A scanner set up with this configuration's bindings, phrases and unit.
    pub fn scanner<S: ScanSource>(
        &self,
        name: impl Into<String>,
        source: S,
        speaker: Speaker,
    ) -> SpatialScanner<S> {
        SpatialScanner::new(name, source, speaker)
            .with_bindings(self.scanner_bindings())
            .with_messages(self.messages.clone())
            .with_unit(self.distance_unit.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use earshot_dispatch::{Action, Key, Modifiers};

    use super::*;

    const SAMPLE: &str = r#"
priority = ["building_panel", "menu", "scanner"]
page_size = 5
distance_unit = "steps"

[announce]
grace_period_ms = 1500

[messages]
empty = "nothing here"

[bindings.navigator]
"ctrl+pageup" = "previous_category"
"f2" = "repeat"

[bindings.scanner]
"f6" = "rescan"
"#;

    #[test]
    fn empty_file_is_default() {
        let cfg = EarshotConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EarshotConfig::default());
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.announce, DedupConfig::default());
    }

    #[test]
    fn sections_fill_in_missing_fields() {
        let cfg = EarshotConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.priority, ["building_panel", "menu", "scanner"]);
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.distance_unit, "steps");
        assert_eq!(cfg.announce.grace_period_ms, 1500);
        assert_eq!(cfg.announce.capacity, DedupConfig::default().capacity);
        assert_eq!(cfg.messages.empty, "nothing here");
        assert_eq!(cfg.messages.no_match, "no match");
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let cfg = EarshotConfig::from_toml_str(SAMPLE).unwrap();
        let nav = cfg.navigator_bindings();
        let none = Modifiers::empty();
        assert_eq!(nav.action_for(Key::Function(2), none), Some(Action::Repeat));
        assert_eq!(nav.action_for(Key::Down, none), Some(Action::Down));

        let scan = cfg.scanner_bindings();
        assert_eq!(scan.action_for(Key::Function(6), none), Some(Action::Rescan));
        assert_eq!(scan.action_for(Key::Function(5), none), Some(Action::Rescan));
    }

    #[test]
    fn bad_chord_is_a_parse_error() {
        let err = EarshotConfig::from_toml_str("[bindings.navigator]\n\"hyper+q\" = \"up\"\n")
            .unwrap_err();
        assert_eq!(err.code(), "EARSHOT-1003");
    }

    #[test]
    fn unknown_action_is_a_parse_error() {
        let err = EarshotConfig::from_toml_str("[bindings.scanner]\n\"f5\" = \"teleport\"\n")
            .unwrap_err();
        assert!(matches!(err, EarshotError::ConfigParse { .. }));
    }

    #[test]
    fn validation_rejects_zero_and_duplicates() {
        let cfg = EarshotConfig {
            page_size: 0,
            ..EarshotConfig::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("page_size"));

        let err = EarshotConfig::from_toml_str("[announce]\ncapacity = 0\n").unwrap_err();
        assert!(err.to_string().contains("capacity"));

        let err = EarshotConfig::from_toml_str("priority = [\"menu\", \"menu\"]\n").unwrap_err();
        assert!(matches!(err, EarshotError::InvalidConfig { .. }));
        assert!(err.to_string().contains("menu"));
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cfg = EarshotConfig::load(file.path()).unwrap();
        assert_eq!(cfg.page_size, 5);
    }

    #[test]
    fn load_returns_error_for_missing_path() {
        let err = EarshotConfig::load(Path::new("/nonexistent/earshot/config.toml")).unwrap_err();
        assert!(matches!(err, EarshotError::MissingConfig { .. }));
    }

    #[test]
    fn built_components_use_the_configuration() {
        let cfg = EarshotConfig::from_toml_str(SAMPLE).unwrap();
        let (speaker, transcript) = Speaker::recording();
        let menu = earshot_navigator::TreeSource::fixed(Vec::new());
        let mut nav = cfg.navigator("menu", menu, 2, speaker);
        nav.open();
        assert_eq!(transcript.borrow().last(), Some("nothing here"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn priority_lists_are_valid_exactly_when_unique(
                names in prop::collection::vec("[a-z_]{1,8}", 0..6),
            ) {
                let unique = names.iter().collect::<HashSet<_>>().len() == names.len();
                let cfg = EarshotConfig {
                    priority: names,
                    ..EarshotConfig::default()
                };
                prop_assert_eq!(cfg.validate().is_ok(), unique);
            }
        }
    }
}
