// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Game data provider seam and the scene-scoped [`GameContext`].

use std::cell::Cell;

use earshot_announce::EventPayload;
use thiserror::Error;

use crate::tree::Node;

/// The game has no data for this request yet.
///
/// Not a failure: it drives the "empty" state of whatever asked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Error)]
#[error("game data unavailable")]
pub struct Unavailable;

/// Identifier of a game entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// A point-in-time view of one entity, shaped for navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Entity kind, e.g. `"building"`.
    pub kind: String,
    /// Entity identifier.
    pub id: EntityId,
    /// Top-level sections, each a labelled tree.
    pub sections: Vec<Node>,
}

/// Live game data.
///
/// Implementations read the game directly and may return [`Unavailable`]
/// while a scene is loading. Results must not be cached by identity beyond a
/// single navigator refresh or scanner rebuild.
pub trait GameDataProvider {
    /// Read a snapshot of entity `id` of `kind`.
    fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable>;

    /// Drain game events that arrived since the last call.
    fn poll_events(&self) -> Vec<EventPayload> {
        Vec::new()
    }
}

/// Whether a [`GameContext`] may be read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// A scene transition is in progress; every read is [`Unavailable`].
    Loading,
    /// The scene is ready.
    Ready,
}

/// A provider handle with an explicit scene lifecycle.
///
/// The host calls [`invalidate`](Self::invalidate) when a scene starts to
/// unload and [`refresh`](Self::refresh) once the new scene is ready. Nothing
/// reads ambient game state: navigators and scanners receive this context and
/// go through it.
///
/// ```rust
/// use earshot_navigator::{ContextState, EntityId, GameContext, GameDataProvider, Snapshot, Unavailable};
///
/// struct Empty;
/// impl GameDataProvider for Empty {
///     fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable> {
///         Ok(Snapshot { kind: kind.into(), id, sections: Vec::new() })
///     }
/// }
///
/// let ctx = GameContext::new(Empty);
/// assert!(ctx.fetch_snapshot("building", EntityId(1)).is_ok());
/// ctx.invalidate();
/// assert_eq!(ctx.state(), ContextState::Loading);
/// assert_eq!(ctx.fetch_snapshot("building", EntityId(1)), Err(Unavailable));
/// ctx.refresh();
/// assert_eq!(ctx.generation(), 1);
/// ```
#[derive(Debug)]
pub struct GameContext<P> {
    provider: P,
    state: Cell<ContextState>,
    generation: Cell<u64>,
}

impl<P> GameContext<P> {
    /// Wrap a provider for a scene that is already ready.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: Cell::new(ContextState::Ready),
            generation: Cell::new(0),
        }
    }

    /// Mark the scene as changing. Every read fails until [`refresh`](Self::refresh).
    pub fn invalidate(&self) {
        if self.state.get() == ContextState::Ready {
            self.generation.set(self.generation.get().wrapping_add(1));
            tracing::debug!(generation = self.generation.get(), "game context invalidated");
        }
        self.state.set(ContextState::Loading);
    }

    /// Mark the new scene as ready.
    pub fn refresh(&self) {
        self.state.set(ContextState::Ready);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ContextState {
        self.state.get()
    }

    /// Number of scene boundaries seen so far.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: GameDataProvider> GameDataProvider for GameContext<P> {
    fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable> {
        match self.state.get() {
            ContextState::Loading => Err(Unavailable),
            ContextState::Ready => self.provider.fetch_snapshot(kind, id),
        }
    }

    fn poll_events(&self) -> Vec<EventPayload> {
        match self.state.get() {
            ContextState::Loading => Vec::new(),
            ContextState::Ready => self.provider.poll_events(),
        }
    }
}
