// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot: a screen-reader navigation engine for games.
//!
//! Earshot sits between a game's keyboard input and a speech output. It
//! decides which overlay owns each key, walks nested game data one entry at a
//! time, finds things on the map by distance and direction, and announces
//! game events without repeating itself.
//!
//! This crate ties the parts together:
//!
//! - [`EarshotConfig`]: TOML configuration (priority order, paging, announcer
//!   tuning, phrases, key binding overrides).
//! - [`Session`]: the dispatch chain plus the current scene's announcer
//!   subscriptions, renewed on [`Session::scene_changed`].
//! - [`EarshotError`]: startup failures with stable codes.
//!
//! The building blocks are re-exported as modules: [`dispatch`],
//! [`announce`], [`navigator`] and [`scanner`]. The [`prelude`] pulls in the
//! names most hosts need.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use earshot::prelude::*;
//!
//! let config = EarshotConfig::from_toml_str(r#"priority = ["menu"]"#).unwrap();
//! let (speaker, transcript) = Speaker::recording();
//!
//! let menu = TreeSource::fixed(vec![Node::list("Resources", ["Wood", "Stone"])]);
//! let menu = Rc::new(RefCell::new(config.navigator("menu", menu, 2, speaker.clone())));
//!
//! let mut session = Session::builder(&config, speaker)
//!     .register(Shared::new(Rc::clone(&menu)))
//!     .build(0)
//!     .unwrap();
//!
//! // Closed navigators let keys through to the game.
//! assert_eq!(session.handle_key(Key::Down, Modifiers::empty()), Dispatched::Forwarded);
//!
//! menu.borrow_mut().open();
//! assert!(session.handle_key(Key::Right, Modifiers::empty()).is_consumed());
//! assert_eq!(transcript.borrow().lines(), ["Resources", "Wood"]);
//! ```

mod config;
mod error;
mod session;

pub use config::{BindingOverrides, DEFAULT_DISTANCE_UNIT, EarshotConfig};
pub use error::{EarshotError, Result};
pub use session::{Session, SessionBuilder};

pub use earshot_announce as announce;
pub use earshot_dispatch as dispatch;
pub use earshot_navigator as navigator;
pub use earshot_scanner as scanner;

/// The names most hosts need.
pub mod prelude {
    pub use crate::{EarshotConfig, EarshotError, Session};
    pub use earshot_announce::{Delivery, EventPayload, MalformedEvent, Speaker, TracingSink};
    pub use earshot_dispatch::{
        Action, Dispatched, FnHandler, Handler, HandlerError, Key, KeyBindings, Modifiers, Shared,
    };
    pub use earshot_navigator::{
        GameContext, GameDataProvider, HierarchicalNavigator, NavigatorSource, Node, TreeSource,
        Unavailable,
    };
    pub use earshot_scanner::{CatalogBuilder, ScanEntry, ScanSource, SpatialScanner};
    pub use kurbo::Point;
}
