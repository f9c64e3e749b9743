// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The handler capability and its stock implementations.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::key::{Key, Modifiers};

/// Error raised from inside [`Handler::process_key`].
///
/// The dispatch chain logs these and treats the key as consumed; they never
/// reach the host.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler found its own state inconsistent.
    #[error("handler state is inconsistent: {0}")]
    InvalidState(String),
    /// A collaborator (data provider, speech sink) failed.
    #[error("collaborator failed: {0}")]
    Collaborator(String),
    /// A shared handler was already borrowed when the key arrived.
    #[error("handler `{0}` is busy")]
    Busy(String),
}

/// A stateful consumer of keystrokes.
///
/// Handlers are registered in a [`KeyDispatchChain`](crate::KeyDispatchChain)
/// in priority order. For each key the chain asks [`is_active`](Self::is_active)
/// and, for the first active handler, calls [`process_key`](Self::process_key).
///
/// `is_active` must be cheap and free of side effects; it can run for every
/// handler on every keystroke. All mutation belongs in `process_key`.
///
/// Returning `Ok(false)` from `process_key` passes the key on to the next
/// active handler (and finally to the game). Handlers with an overlay open
/// should consume keys they have no meaning for, so the game never receives
/// stray input.
pub trait Handler {
    /// Stable name used by the priority configuration and in logs.
    fn name(&self) -> &str;

    /// Whether this handler currently wants keyboard input.
    fn is_active(&self) -> bool;

    /// Handle one key event; `Ok(true)` means consumed.
    fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, HandlerError>;
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, HandlerError> {
        (**self).process_key(key, modifiers)
    }
}

/// A handler shared between the chain and the host.
///
/// The host keeps the `Rc<RefCell<H>>` (for example to open a navigator when
/// its popup appears) while the chain owns the `Shared` wrapper. The name is
/// copied once at construction because it cannot be borrowed out of the cell.
///
/// A handler that is already borrowed reports itself inactive and returns
/// [`HandlerError::Busy`] from `process_key`.
pub struct Shared<H: ?Sized> {
    name: String,
    inner: Rc<RefCell<H>>,
}

impl<H: Handler + ?Sized> Shared<H> {
    /// Wrap a shared handler, capturing its current name.
    pub fn new(inner: Rc<RefCell<H>>) -> Self {
        let name = inner.borrow().name().to_owned();
        Self { name, inner }
    }

    /// The shared cell, for host-side access.
    pub fn handle(&self) -> Rc<RefCell<H>> {
        Rc::clone(&self.inner)
    }
}

impl<H: ?Sized> fmt::Debug for Shared<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<H: Handler + ?Sized> Handler for Shared<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.inner.try_borrow().is_ok_and(|h| h.is_active())
    }

    fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, HandlerError> {
        match self.inner.try_borrow_mut() {
            Ok(mut h) => h.process_key(key, modifiers),
            Err(_) => Err(HandlerError::Busy(self.name.clone())),
        }
    }
}

/// A handler assembled from two closures.
///
/// Useful for small global hotkeys that do not warrant their own type.
///
/// ```rust
/// use earshot_dispatch::{FnHandler, Handler, Key, Modifiers};
///
/// let mut quit = FnHandler::new(
///     "quit",
///     || true,
///     |key, mods| Ok(key == Key::Char('q') && mods.contains(Modifiers::CTRL)),
/// );
/// assert!(quit.process_key(Key::Char('q'), Modifiers::CTRL).unwrap());
/// assert!(!quit.process_key(Key::Char('q'), Modifiers::empty()).unwrap());
/// ```
pub struct FnHandler<A, P> {
    name: String,
    active: A,
    process: P,
}

impl<A, P> FnHandler<A, P>
where
    A: Fn() -> bool,
    P: FnMut(Key, Modifiers) -> Result<bool, HandlerError>,
{
    /// Create a handler from an activity predicate and a key callback.
    pub fn new(name: impl Into<String>, active: A, process: P) -> Self {
        Self {
            name: name.into(),
            active,
            process,
        }
    }
}

impl<A, P> fmt::Debug for FnHandler<A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<A, P> Handler for FnHandler<A, P>
where
    A: Fn() -> bool,
    P: FnMut(Key, Modifiers) -> Result<bool, HandlerError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        (self.active)()
    }

    fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, HandlerError> {
        (self.process)(key, modifiers)
    }
}
