// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch chain: route one key event to the first active handler that consumes it.
//!
//! The chain is deliberately small:
//!
//! - Handlers are kept in priority order, highest first, and the order is
//!   fixed once the chain is built.
//! - For each key, handlers whose [`is_active`](crate::Handler::is_active)
//!   returns `false` are skipped.
//! - An active handler returning `Ok(true)` consumes the key and stops the walk.
//! - An active handler returning `Ok(false)` passes the key on (for example an
//!   Escape that closed an overlay and should also dismiss a game popup).
//! - An error or panic from `process_key` is logged and counts as consumed:
//!   eating a keystroke is safer than leaking it into the game.
//! - If nothing consumes the key, [`Dispatched::Forwarded`] tells the host to
//!   hand the key to the game unmodified.
//!
//! ## Minimal example
//!
//! ```rust
//! use earshot_dispatch::{Dispatched, FnHandler, Key, KeyDispatchChain, Modifiers};
//!
//! let mut chain = KeyDispatchChain::builder()
//!     .register(FnHandler::new("inactive", || false, |_, _| Ok(true)))
//!     .register(FnHandler::new("pass", || true, |_, _| Ok(false)))
//!     .register(FnHandler::new("eat", || true, |_, _| Ok(true)))
//!     .build();
//!
//! assert_eq!(chain.dispatch(Key::Down, Modifiers::empty()), Dispatched::Consumed { handler: 2 });
//! ```
//!
//! ### Priority from configuration
//!
//! ```rust
//! use earshot_dispatch::{FnHandler, KeyDispatchChain};
//!
//! let chain = KeyDispatchChain::builder()
//!     .register(FnHandler::new("scanner", || true, |_, _| Ok(true)))
//!     .register(FnHandler::new("menu", || true, |_, _| Ok(true)))
//!     .build_with_priority(&["menu"])
//!     .unwrap();
//!
//! // Listed handlers come first, the rest keep registration order.
//! assert_eq!(chain.names().collect::<Vec<_>>(), ["menu", "scanner"]);
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use hashbrown::HashSet;
use thiserror::Error;

use crate::handler::{Handler, HandlerError};
use crate::key::{Key, Modifiers};

/// Result of dispatching one key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dispatched {
    /// The handler at this chain position consumed the key.
    Consumed {
        /// Position of the consuming handler in the chain.
        handler: usize,
    },
    /// The handler at this chain position faulted; the key is treated as consumed.
    Faulted {
        /// Position of the faulting handler in the chain.
        handler: usize,
    },
    /// No active handler consumed the key; forward it to the game.
    Forwarded,
}

impl Dispatched {
    /// Whether the game must not see this key.
    pub const fn is_consumed(self) -> bool {
        !matches!(self, Self::Forwarded)
    }
}

/// Errors raised while resolving the startup priority order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The priority list names a handler that was never registered.
    #[error("priority list names unknown handler `{0}`")]
    UnknownHandler(String),
    /// The priority list names the same handler twice.
    #[error("priority list names handler `{0}` more than once")]
    DuplicatePriority(String),
}

/// Ordered, immutable list of handlers.
///
/// ## Usage
///
/// - Register handlers with [`KeyDispatchChain::builder`], then call
///   [`ChainBuilder::build`] (registration order) or
///   [`ChainBuilder::build_with_priority`] (configured order).
/// - Call [`KeyDispatchChain::dispatch`] once per key event and forward the key
///   to the game when the result is [`Dispatched::Forwarded`].
pub struct KeyDispatchChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl fmt::Debug for KeyDispatchChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDispatchChain")
            .field("handlers", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl KeyDispatchChain {
    /// Build a chain from handlers already in priority order.
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Start building a chain.
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    /// Number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.name())
    }

    /// Position of the first handler that is currently active, if any.
    pub fn active_handler(&self) -> Option<usize> {
        self.handlers.iter().position(|h| h.is_active())
    }

    /// Route one key event through the chain.
    ///
    /// Walks handlers in priority order and calls `process_key` on each
    /// active one until a handler consumes the key. Errors and panics are
    /// contained here and reported as [`Dispatched::Faulted`].
    pub fn dispatch(&mut self, key: Key, modifiers: Modifiers) -> Dispatched {
        for (i, handler) in self.handlers.iter_mut().enumerate() {
            if !handler.is_active() {
                continue;
            }
            tracing::trace!(handler = handler.name(), %key, ?modifiers, "routing key");
            let result = catch_unwind(AssertUnwindSafe(|| handler.process_key(key, modifiers)));
            match result {
                Ok(Ok(true)) => return Dispatched::Consumed { handler: i },
                Ok(Ok(false)) => {}
                Ok(Err(err)) => {
                    log_fault(handler.name(), key, &err);
                    return Dispatched::Faulted { handler: i };
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    log_fault(
                        handler.name(),
                        key,
                        &HandlerError::InvalidState(format!("panicked: {reason}")),
                    );
                    return Dispatched::Faulted { handler: i };
                }
            }
        }
        Dispatched::Forwarded
    }
}

fn log_fault(name: &str, key: Key, err: &HandlerError) {
    tracing::error!(handler = name, %key, error = %err, "handler fault; key consumed");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic payload")
    }
}

/// Collects handlers before the chain is frozen.
#[derive(Default)]
pub struct ChainBuilder {
    handlers: Vec<Box<dyn Handler>>,
}

impl fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainBuilder")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ChainBuilder {
    /// Append a handler after those already registered.
    #[must_use]
    pub fn register(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append an already boxed handler.
    #[must_use]
    pub fn register_boxed(mut self, handler: Box<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Freeze the chain in registration order.
    pub fn build(self) -> KeyDispatchChain {
        KeyDispatchChain::new(self.handlers)
    }

    /// Freeze the chain with the handlers named in `priority` first.
    ///
    /// Handlers not named keep their registration order after the listed ones.
    /// Naming an unregistered handler, or the same handler twice, is an error.
    pub fn build_with_priority<S: AsRef<str>>(
        self,
        priority: &[S],
    ) -> Result<KeyDispatchChain, ChainError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in priority {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(ChainError::DuplicatePriority(name.to_owned()));
            }
            if !self.handlers.iter().any(|h| h.name() == name) {
                return Err(ChainError::UnknownHandler(name.to_owned()));
            }
        }

        let mut remaining: Vec<Option<Box<dyn Handler>>> =
            self.handlers.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        for name in priority {
            let name = name.as_ref();
            if let Some(slot) = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|h| h.name() == name))
                && let Some(handler) = slot.take()
            {
                ordered.push(handler);
            }
        }
        let unlisted: Vec<Box<dyn Handler>> = remaining.into_iter().flatten().collect();
        if !priority.is_empty() {
            for handler in &unlisted {
                tracing::debug!(
                    handler = handler.name(),
                    "handler not in priority list; appended in registration order"
                );
            }
        }
        ordered.extend(unlisted);
        Ok(KeyDispatchChain::new(ordered))
    }
}
