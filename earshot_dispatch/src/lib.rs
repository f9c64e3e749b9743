// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot Dispatch: decide who owns each keystroke.
//!
//! A screen-reader overlay competes with the game and with other overlays for
//! every key press. This crate models that competition as an ordered chain:
//!
//! - [`Handler`]: a stateful consumer with a cheap, side-effect-free
//!   [`is_active`](Handler::is_active) predicate and a
//!   [`process_key`](Handler::process_key) method that returns whether the key
//!   was consumed.
//! - [`KeyDispatchChain`]: an immutable, priority-ordered list of handlers.
//!   The first active handler that consumes a key wins; a handler may pass a
//!   key on deliberately; faults are contained and count as consumed.
//! - [`Key`], [`Modifiers`], [`KeyChord`]: the input vocabulary.
//! - [`Action`] and [`KeyBindings`]: the configuration surface mapping chords
//!   to logical actions, with defaults for navigators and scanners.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use earshot_dispatch::{Dispatched, FnHandler, Handler, HandlerError, Key, KeyDispatchChain, Modifiers, Shared};
//!
//! struct Overlay { open: bool }
//!
//! impl Handler for Overlay {
//!     fn name(&self) -> &str { "overlay" }
//!     fn is_active(&self) -> bool { self.open }
//!     fn process_key(&mut self, key: Key, _: Modifiers) -> Result<bool, HandlerError> {
//!         if key == Key::Escape {
//!             self.open = false;
//!             // Let the game close its own popup too.
//!             return Ok(false);
//!         }
//!         Ok(true)
//!     }
//! }
//!
//! let overlay = Rc::new(RefCell::new(Overlay { open: true }));
//! let mut chain = KeyDispatchChain::builder()
//!     .register(Shared::new(Rc::clone(&overlay)))
//!     .register(FnHandler::new("hotkeys", || true, |key, _| Ok(key == Key::Function(1))))
//!     .build();
//!
//! assert_eq!(chain.dispatch(Key::Down, Modifiers::empty()), Dispatched::Consumed { handler: 0 });
//! assert_eq!(chain.dispatch(Key::Escape, Modifiers::empty()), Dispatched::Forwarded);
//! assert!(!overlay.borrow().open);
//! ```
//!
//! The chain is single-threaded: one key is fully dispatched before the next
//! is accepted, and each handler's state is only mutated by its own
//! `process_key`.

mod bindings;
mod chain;
mod handler;
mod key;

pub use bindings::{Action, KeyBindings};
pub use chain::{ChainBuilder, ChainError, Dispatched, KeyDispatchChain};
pub use handler::{FnHandler, Handler, HandlerError, Shared};
pub use key::{Key, KeyChord, Modifiers, ParseKeyError};
