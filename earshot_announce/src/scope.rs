// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped event subscriptions with guaranteed teardown.

use hashbrown::HashMap;

use crate::dedup::{AnnouncementDeduplicator, DedupConfig, Delivery};
use crate::payload::{EventPayload, MalformedEvent};
use crate::speech::Speaker;

/// A set of announcer subscriptions tied to one scene or context.
///
/// Every subscription made through a scope shares the scope's start time as
/// the start of its grace period. Disposing the scope, or dropping it, tears
/// down every subscription and its cache; published events are then ignored.
///
/// ```rust
/// use earshot_announce::{AnnouncerScope, DedupConfig, Delivery, EventPayload, Speaker};
///
/// let (speaker, transcript) = Speaker::recording();
/// let mut scope = AnnouncerScope::new(DedupConfig::default(), speaker, 0);
/// scope.subscribe(
///     "villager_born",
///     |ev| ev.field("name").map(str::to_owned),
///     |ev| Ok(format!("{} was born", ev.field("name")?)),
/// );
///
/// let ev = EventPayload::new("villager_born").with_field("name", "Ada");
/// assert_eq!(scope.publish(&ev, 100), Some(Delivery::GracePeriod));
/// assert!(scope.publish(&ev, 2500).is_some_and(|d| d.is_spoken()));
/// assert_eq!(scope.publish(&EventPayload::new("unrelated"), 2500), None);
///
/// scope.dispose();
/// assert_eq!(scope.publish(&ev, 9000), Some(Delivery::Disposed));
/// assert_eq!(transcript.borrow().lines(), ["Ada was born"]);
/// ```
#[derive(Debug)]
pub struct AnnouncerScope {
    config: DedupConfig,
    speaker: Speaker,
    started_at: u64,
    subscriptions: HashMap<String, AnnouncementDeduplicator<EventPayload>>,
    disposed: bool,
}

impl AnnouncerScope {
    /// Open a scope whose grace period starts at `now`.
    pub fn new(config: DedupConfig, speaker: Speaker, now: u64) -> Self {
        Self {
            config,
            speaker,
            started_at: now,
            subscriptions: HashMap::new(),
            disposed: false,
        }
    }

    /// Announce events of `kind`.
    ///
    /// Subscribing to a kind twice replaces the earlier subscription and its cache.
    /// Subscribing on a disposed scope does nothing.
    pub fn subscribe(
        &mut self,
        kind: impl Into<String>,
        key_of: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
        format: impl Fn(&EventPayload) -> Result<String, MalformedEvent> + 'static,
    ) {
        let kind = kind.into();
        if self.disposed {
            tracing::warn!(kind = %kind, "subscribe on disposed announcer scope ignored");
            return;
        }
        let dedup = AnnouncementDeduplicator::new(
            self.config,
            self.speaker.clone(),
            self.started_at,
            key_of,
            format,
        )
        .with_kind(kind.clone());
        if self.subscriptions.insert(kind.clone(), dedup).is_some() {
            tracing::warn!(kind = %kind, "replaced existing announcer subscription");
        }
    }

    /// Route one pushed event to its subscription.
    ///
    /// Returns `None` when nothing subscribes to the event's kind.
    pub fn publish(&mut self, event: &EventPayload, now: u64) -> Option<Delivery> {
        if self.disposed {
            return Some(Delivery::Disposed);
        }
        self.subscriptions
            .get_mut(event.kind())
            .map(|dedup| dedup.submit(event, now))
    }

    /// Whether a subscription exists for `kind`.
    pub fn is_subscribed(&self, kind: &str) -> bool {
        self.subscriptions.contains_key(kind)
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Start of the grace period shared by this scope's subscriptions.
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Tear down every subscription. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for dedup in self.subscriptions.values_mut() {
            dedup.dispose();
        }
        tracing::debug!(subscriptions = self.subscriptions.len(), "announcer scope disposed");
        self.subscriptions.clear();
        self.disposed = true;
    }

    /// Whether the scope has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for AnnouncerScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
