// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The top-level object a host drives: keys in, events in, speech out.

use std::fmt;
use std::rc::Rc;

use earshot_announce::{AnnouncerScope, DedupConfig, Delivery, EventPayload, MalformedEvent, Speaker};
use earshot_dispatch::{ChainBuilder, Dispatched, Handler, Key, KeyDispatchChain, Modifiers};
use earshot_navigator::GameDataProvider;

use crate::config::EarshotConfig;
use crate::error::EarshotError;

type Extract = Rc<dyn Fn(&EventPayload) -> Result<String, MalformedEvent>>;

struct Subscription {
    kind: String,
    key_of: Extract,
    format: Extract,
}

impl Subscription {
    fn attach(&self, scope: &mut AnnouncerScope) {
        let key_of = Rc::clone(&self.key_of);
        let format = Rc::clone(&self.format);
        scope.subscribe(
            self.kind.clone(),
            move |ev: &EventPayload| key_of(ev),
            move |ev: &EventPayload| format(ev),
        );
    }
}

/// Dispatch chain plus the announcer subscriptions of the current scene.
///
/// Subscriptions are remembered so that [`scene_changed`](Self::scene_changed)
/// can tear the old scope down and subscribe again with a fresh grace clock.
pub struct Session {
    chain: KeyDispatchChain,
    speaker: Speaker,
    announce: DedupConfig,
    scope: AnnouncerScope,
    subscriptions: Vec<Subscription>,
    scene: u64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("chain", &self.chain)
            .field("scope", &self.scope)
            .field(
                "subscriptions",
                &self.subscriptions.iter().map(|s| s.kind.as_str()).collect::<Vec<_>>(),
            )
            .field("scene", &self.scene)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start assembling a session.
    pub fn builder(config: &EarshotConfig, speaker: Speaker) -> SessionBuilder {
        SessionBuilder {
            priority: config.priority.clone(),
            announce: config.announce,
            speaker,
            chain: KeyDispatchChain::builder(),
            subscriptions: Vec::new(),
        }
    }

    /// Route one key event. Forward the key to the game when the result is
    /// [`Dispatched::Forwarded`].
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> Dispatched {
        self.chain.dispatch(key, modifiers)
    }

    /// Announce events of `kind` in this and every later scene.
    pub fn subscribe(
        &mut self,
        kind: impl Into<String>,
        key_of: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
        format: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
    ) {
        let sub = Subscription {
            kind: kind.into(),
            key_of: Rc::new(key_of),
            format: Rc::new(format),
        };
        sub.attach(&mut self.scope);
        self.subscriptions.retain(|s| s.kind != sub.kind);
        self.subscriptions.push(sub);
    }

    /// Deliver one pushed game event.
    pub fn publish(&mut self, event: &EventPayload, now: u64) -> Option<Delivery> {
        self.scope.publish(event, now)
    }

    /// Drain `provider`'s pending events and publish them in order.
    ///
    /// Returns how many were spoken.
    pub fn pump<P: GameDataProvider + ?Sized>(&mut self, provider: &P, now: u64) -> usize {
        provider
            .poll_events()
            .iter()
            .filter(|ev| self.publish(ev, now).is_some_and(|d| d.is_spoken()))
            .count()
    }

    /// Tear down the current scene's announcer state and start a new one at `now`.
    ///
    /// Dedup caches are dropped and every subscription's grace period starts
    /// over. Handlers and game data are untouched; the host owns those.
    pub fn scene_changed(&mut self, now: u64) {
        self.scope.dispose();
        let mut scope = AnnouncerScope::new(self.announce, self.speaker.clone(), now);
        for sub in &self.subscriptions {
            sub.attach(&mut scope);
        }
        self.scope = scope;
        self.scene = self.scene.wrapping_add(1);
        tracing::debug!(
            scene = self.scene,
            subscriptions = self.subscriptions.len(),
            "scene changed; announcer scope renewed"
        );
    }

    /// Number of scene changes seen.
    pub fn scene(&self) -> u64 {
        self.scene
    }

    /// The dispatch chain.
    pub fn chain(&self) -> &KeyDispatchChain {
        &self.chain
    }

    /// The current scene's announcer scope.
    pub fn scope(&self) -> &AnnouncerScope {
        &self.scope
    }

    /// The speaker every announcement goes through.
    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }
}

/// Collects handlers and subscriptions before a [`Session`] starts.
pub struct SessionBuilder {
    priority: Vec<String>,
    announce: DedupConfig,
    speaker: Speaker,
    chain: ChainBuilder,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("priority", &self.priority)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Append a handler in registration order.
    #[must_use]
    pub fn register(mut self, handler: impl Handler + 'static) -> Self {
        self.chain = self.chain.register(handler);
        self
    }

    /// Append an already boxed handler.
    #[must_use]
    pub fn register_boxed(mut self, handler: Box<dyn Handler>) -> Self {
        self.chain = self.chain.register_boxed(handler);
        self
    }

    /// Announce events of `kind` once the session starts.
    #[must_use]
    pub fn subscribe(
        mut self,
        kind: impl Into<String>,
        key_of: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
        format: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
    ) -> Self {
        let kind = kind.into();
        self.subscriptions.retain(|s| s.kind != kind);
        self.subscriptions.push(Subscription {
            kind,
            key_of: Rc::new(key_of),
            format: Rc::new(format),
        });
        self
    }

    /// Resolve the priority order and open the first scene at `now`.
    pub fn build(self, now: u64) -> Result<Session, EarshotError> {
        let chain = self
            .chain
            .build_with_priority(self.priority.as_slice())
            .inspect_err(|err| tracing::warn!(error = %err, "handler priority list rejected"))?;
        let mut scope = AnnouncerScope::new(self.announce, self.speaker.clone(), now);
        for sub in &self.subscriptions {
            sub.attach(&mut scope);
        }
        tracing::debug!(
            handlers = chain.len(),
            subscriptions = self.subscriptions.len(),
            "session started"
        );
        Ok(Session {
            chain,
            speaker: self.speaker,
            announce: self.announce,
            scope,
            subscriptions: self.subscriptions,
            scene: 0,
        })
    }
}
