// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Earshot Announce: speech output and game-event announcements.
//!
//! - [`SpeechSink`] and [`Speaker`]: where utterances go. A `Speaker` is a
//!   cheap, cloneable handle every component speaks through.
//!   [`Transcript`] records utterances for tests; [`TracingSink`] logs them.
//! - [`EventPayload`]: a pushed game event with named string fields, any of
//!   which may be missing ([`MalformedEvent`]).
//! - [`AnnouncementDeduplicator`]: drops events during a grace period after
//!   subscription and drops events whose dedup key was already announced.
//!   Keys live in a bounded FIFO [`DedupCache`].
//! - [`AnnouncerScope`]: the subscriptions belonging to one scene, torn down
//!   together on [`dispose`](AnnouncerScope::dispose) or drop.
//!
//! Time is always passed in explicitly as `u64` milliseconds.

mod cache;
mod dedup;
mod payload;
mod scope;
mod speech;

pub use cache::{DEFAULT_CAPACITY, DedupCache};
pub use dedup::{AnnouncementDeduplicator, DEFAULT_GRACE_PERIOD_MS, DedupConfig, Delivery};
pub use payload::{EventPayload, MalformedEvent};
pub use scope::AnnouncerScope;
pub use speech::{Speaker, SpeechSink, Transcript, TracingSink};
