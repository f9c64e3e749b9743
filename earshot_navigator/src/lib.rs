// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot Navigator: cursor-based navigation over nested game data.
//!
//! Menus, object panels and similar screens share one model here: a stack of
//! 2 to 4 levels, each with a count and a selected index, driven by logical
//! [`Action`](earshot_dispatch::Action)s and read aloud through a
//! [`Speaker`](earshot_announce::Speaker).
//!
//! - [`wrap_index`] / [`step_index`]: circular index arithmetic. An empty
//!   level has no index (`None`).
//! - [`TypeAheadSearch`] / [`first_prefix_match`]: jump to an entry by typing
//!   the start of its name.
//! - [`NavigatorSource`]: the data seam, addressed by index paths.
//! - [`HierarchicalNavigator`]: the state machine, a
//!   [`Handler`](earshot_dispatch::Handler) for the dispatch chain.
//! - [`Node`] / [`TreeSource`]: labelled trees for static menus and entity
//!   snapshots.
//! - [`GameDataProvider`] / [`GameContext`]: live game data behind an
//!   explicit scene lifecycle.
//!
//! ## Example
//!
//! ```rust
//! use earshot_announce::Speaker;
//! use earshot_dispatch::{Handler, Key, Modifiers};
//! use earshot_navigator::{HierarchicalNavigator, Node, TreeSource};
//!
//! let (speaker, transcript) = Speaker::recording();
//! let menu = TreeSource::fixed(vec![
//!     Node::list("Resources", ["Wood", "Stone"]),
//!     Node::list("Villagers", ["Ada"]),
//! ]);
//! let mut nav = HierarchicalNavigator::new("menu", menu, 2, speaker);
//! let none = Modifiers::empty();
//!
//! nav.open();
//! nav.process_key(Key::Down, none).unwrap();
//! nav.process_key(Key::Down, none).unwrap();
//! nav.process_key(Key::Right, none).unwrap();
//! nav.process_key(Key::Down, none).unwrap();
//! nav.process_key(Key::Left, none).unwrap();
//! assert_eq!(nav.current_index(), Some(0));
//!
//! // Escape at the top closes, clears, and lets the game see the key too.
//! assert!(!nav.process_key(Key::Escape, none).unwrap());
//! assert_eq!(
//!     transcript.borrow().lines(),
//!     ["Resources", "Villagers", "Resources", "Wood", "Stone", "Resources"],
//! );
//! ```

mod messages;
mod navigator;
mod provider;
mod search;
mod source;
mod tree;
mod wrap;

pub use messages::Messages;
pub use navigator::{
    DEFAULT_PAGE_SIZE, HierarchicalNavigator, Level, LoadState, MAX_LEVELS, MIN_LEVELS,
};
pub use provider::{ContextState, EntityId, GameContext, GameDataProvider, Snapshot, Unavailable};
pub use search::{TypeAheadSearch, first_prefix_match};
pub use source::NavigatorSource;
pub use tree::{Node, TreeSource};
pub use wrap::{step_index, wrap_index};
