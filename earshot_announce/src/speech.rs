// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Speech sinks and the shared [`Speaker`] handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Accepts utterances and speaks them.
///
/// Speaking is fire-and-forget: implementations must not block, and a new
/// utterance may interrupt the previous one.
pub trait SpeechSink {
    /// Speak `utterance`.
    fn say(&mut self, utterance: &str);
}

/// Cloneable handle to the process-wide speech sink.
///
/// Every handler and announcer holds a clone. All clones speak through the
/// same sink, on the single logical thread that drives input and events.
#[derive(Clone)]
pub struct Speaker {
    sink: Rc<RefCell<dyn SpeechSink>>,
}

impl fmt::Debug for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Speaker").finish_non_exhaustive()
    }
}

impl Speaker {
    /// Wrap an owned sink.
    pub fn new(sink: impl SpeechSink + 'static) -> Self {
        Self {
            sink: Rc::new(RefCell::new(sink)),
        }
    }

    /// Speak through a sink the caller also keeps a handle to.
    pub fn shared<S: SpeechSink + 'static>(sink: Rc<RefCell<S>>) -> Self {
        Self { sink }
    }

    /// A speaker backed by a fresh [`Transcript`], plus the transcript handle.
    pub fn recording() -> (Self, Rc<RefCell<Transcript>>) {
        let transcript = Rc::new(RefCell::new(Transcript::default()));
        (Self::shared(Rc::clone(&transcript)), transcript)
    }

    /// Speak `utterance`.
    ///
    /// If the sink is already speaking re-entrantly (a sink that calls back
    /// into an announcer), the utterance is dropped and logged.
    pub fn say(&self, utterance: &str) {
        match self.sink.try_borrow_mut() {
            Ok(mut sink) => sink.say(utterance),
            Err(_) => tracing::warn!(utterance, "speech sink busy; utterance dropped"),
        }
    }
}

/// A sink that records every utterance, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// All utterances so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most recent utterance.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Take all recorded utterances, leaving the transcript empty.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Forget all recorded utterances.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl SpeechSink for Transcript {
    fn say(&mut self, utterance: &str) {
        self.lines.push(utterance.to_owned());
    }
}

/// A sink that emits each utterance as an `info` event on target `earshot::speech`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl SpeechSink for TracingSink {
    fn say(&mut self, utterance: &str) {
        tracing::info!(target: "earshot::speech", "{utterance}");
    }
}

impl<F: FnMut(&str)> SpeechSink for F {
    fn say(&mut self, utterance: &str) {
        self(utterance);
    }
}
