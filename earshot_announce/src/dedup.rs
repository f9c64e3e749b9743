// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-windowed duplicate suppression for asynchronous game events.
//!
//! Timestamps are `u64` milliseconds on whatever clock the host uses, passed
//! in explicitly. There is no ambient clock.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CAPACITY, DedupCache};
use crate::payload::MalformedEvent;
use crate::speech::Speaker;

/// Default grace period after subscription, in milliseconds.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2000;

/// Deduplicator tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Events arriving within this many milliseconds of subscription are dropped.
    pub grace_period_ms: u64,
    /// Number of dedup keys remembered.
    pub capacity: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// What happened to a submitted event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The event was new and this utterance was spoken.
    Spoken(String),
    /// Dropped: still inside the grace period.
    GracePeriod,
    /// Dropped: its key was already announced.
    Duplicate,
    /// Dropped: the payload could not be keyed or formatted.
    Malformed,
    /// Dropped: the deduplicator has been disposed.
    Disposed,
}

impl Delivery {
    /// Whether anything was spoken.
    pub fn is_spoken(&self) -> bool {
        matches!(self, Self::Spoken(_))
    }
}

type Extract<E> = Box<dyn Fn(&E) -> Result<String, MalformedEvent>>;

/// Filters one stream of events down to new, announceable ones.
///
/// For each submitted event:
///
/// 1. If disposed, drop.
/// 2. If `now` is inside the grace period, drop.
/// 3. Reduce the event to a dedup key; drop and log if malformed.
/// 4. If the key was already announced, drop.
/// 5. Format the utterance; drop and log if malformed.
/// 6. Remember the key and speak.
///
/// A formatting failure does not consume the key, so a later well-formed
/// event with the same key is still announced.
pub struct AnnouncementDeduplicator<E> {
    kind: String,
    started_at: u64,
    config: DedupConfig,
    cache: DedupCache,
    key_of: Extract<E>,
    format: Extract<E>,
    speaker: Speaker,
    disposed: bool,
}

impl<E> fmt::Debug for AnnouncementDeduplicator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncementDeduplicator")
            .field("kind", &self.kind)
            .field("started_at", &self.started_at)
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<E> AnnouncementDeduplicator<E> {
    /// Start a subscription at `started_at`.
    pub fn new(
        config: DedupConfig,
        speaker: Speaker,
        started_at: u64,
        key_of: impl Fn(&E) -> Result<String, MalformedEvent> + 'static,
        format: impl Fn(&E) -> Result<String, MalformedEvent> + 'static,
    ) -> Self {
        Self {
            kind: String::from("event"),
            started_at,
            config,
            cache: DedupCache::new(config.capacity),
            key_of: Box::new(key_of),
            format: Box::new(format),
            speaker,
            disposed: false,
        }
    }

    /// Name the event kind this deduplicator filters, for logging.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// The event kind, `"event"` unless set with [`with_kind`](Self::with_kind).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether `now` is still inside the grace period.
    pub fn in_grace(&self, now: u64) -> bool {
        now.saturating_sub(self.started_at) < self.config.grace_period_ms
    }

    /// Offer one event at time `now`.
    pub fn submit(&mut self, event: &E, now: u64) -> Delivery {
        if self.disposed {
            return Delivery::Disposed;
        }
        if self.in_grace(now) {
            tracing::debug!(
                kind = %self.kind,
                now,
                started_at = self.started_at,
                "event dropped during grace period"
            );
            return Delivery::GracePeriod;
        }
        let key = match (self.key_of)(event) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(kind = %self.kind, reason = %err, "malformed event dropped");
                return Delivery::Malformed;
            }
        };
        if self.cache.contains(&key) {
            tracing::debug!(kind = %self.kind, key = %key, "duplicate event dropped");
            return Delivery::Duplicate;
        }
        let utterance = match (self.format)(event) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(kind = %self.kind, reason = %err, "malformed event dropped");
                return Delivery::Malformed;
            }
        };
        self.cache.insert(key);
        self.speaker.say(&utterance);
        Delivery::Spoken(utterance)
    }

    /// Stop forwarding and forget every key.
    pub fn dispose(&mut self) {
        self.cache.clear();
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The keys announced so far.
    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    /// Start of the grace period.
    pub fn started_at(&self) -> u64 {
        self.started_at
    }
}
