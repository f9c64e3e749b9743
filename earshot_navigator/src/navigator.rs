// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The N-level cursor state machine.

use earshot_announce::Speaker;
use earshot_dispatch::{Action, Handler, HandlerError, Key, KeyBindings, Modifiers};
use smallvec::SmallVec;

use crate::messages::Messages;
use crate::search::{TypeAheadSearch, first_prefix_match};
use crate::source::NavigatorSource;
use crate::wrap::{clamp_step, step_index};

/// Fewest levels a navigator may have.
pub const MIN_LEVELS: usize = 2;
/// Most levels a navigator may have.
pub const MAX_LEVELS: usize = 4;
/// Entries skipped by page up / page down unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Data lifecycle of a navigator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Nothing loaded since construction or the last [`clear_data`](HierarchicalNavigator::clear_data).
    Uninitialized,
    /// A refresh is in progress.
    Loading,
    /// Data is loaded.
    Ready,
    /// The last refresh found no data; the navigator shows an empty level.
    Unavailable,
}

/// One level of the cursor stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Level {
    /// Entries at this level. May be 0.
    pub count: usize,
    /// Selected entry, `None` when the level is empty.
    pub current: Option<usize>,
}

impl Level {
    fn new(count: usize) -> Self {
        Self {
            count,
            current: (count > 0).then_some(0),
        }
    }
}

type Path = SmallVec<[usize; MAX_LEVELS]>;

/// A [`Handler`] that walks a fixed number of nested levels.
///
/// Levels form a stack: the bottom is the top-level list, the last element
/// is the level the user is on. Descending pushes a child level starting at
/// its first entry; ascending pops it, so the parent keeps its selection.
///
/// The navigator only receives keys while open. Data is read from the
/// [`NavigatorSource`] once per interaction session: on the first
/// [`open`](Self::open) after construction or after
/// [`clear_data`](Self::clear_data).
///
/// ```rust
/// use earshot_announce::Speaker;
/// use earshot_dispatch::{Handler, Key, Modifiers};
/// use earshot_navigator::{HierarchicalNavigator, Node, TreeSource};
///
/// let (speaker, transcript) = Speaker::recording();
/// let source = TreeSource::fixed(vec![Node::list("Resources", ["Wood", "Stone"])]);
/// let mut nav = HierarchicalNavigator::new("menu", source, 2, speaker);
///
/// nav.open();
/// nav.process_key(Key::Right, Modifiers::empty()).unwrap();
/// nav.process_key(Key::Char('s'), Modifiers::empty()).unwrap();
/// assert_eq!(transcript.borrow().lines(), ["Resources", "Wood", "Stone"]);
/// ```
#[derive(Debug)]
pub struct HierarchicalNavigator<S> {
    name: String,
    source: S,
    max_levels: usize,
    levels: SmallVec<[Level; MAX_LEVELS]>,
    state: LoadState,
    open: bool,
    search: TypeAheadSearch,
    speaker: Speaker,
    bindings: KeyBindings,
    messages: Messages,
    page_size: usize,
}

impl<S: NavigatorSource> HierarchicalNavigator<S> {
    /// Create a closed navigator with `levels` levels (clamped to 2..=4).
    pub fn new(name: impl Into<String>, source: S, levels: usize, speaker: Speaker) -> Self {
        let name = name.into();
        let max_levels = levels.clamp(MIN_LEVELS, MAX_LEVELS);
        if max_levels != levels {
            tracing::warn!(navigator = %name, levels, max_levels, "level count clamped");
        }
        Self {
            name,
            source,
            max_levels,
            levels: SmallVec::new(),
            state: LoadState::Uninitialized,
            open: false,
            search: TypeAheadSearch::new(),
            speaker,
            bindings: KeyBindings::navigator_defaults(),
            messages: Messages::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replace the key bindings.
    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the spoken phrases.
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Set the page up / page down stride (at least 1).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Open the navigator and announce the current entry.
    ///
    /// Loads data if nothing is loaded. If the source is unavailable the
    /// navigator still opens, on an empty level.
    pub fn open(&mut self) {
        if matches!(self.state, LoadState::Uninitialized | LoadState::Unavailable) {
            self.refresh();
        }
        self.open = true;
        tracing::debug!(navigator = %self.name, state = ?self.state, "navigator opened");
        self.announce_current();
    }

    /// Reload data from the source, keeping the cursor where it still fits.
    pub fn refresh(&mut self) -> LoadState {
        self.state = LoadState::Loading;
        match self.source.refresh() {
            Ok(()) => {
                self.state = LoadState::Ready;
                self.resync_levels();
            }
            Err(err) => {
                tracing::debug!(navigator = %self.name, %err, "navigator source unavailable");
                self.state = LoadState::Unavailable;
                self.levels.clear();
                self.levels.push(Level::new(0));
            }
        }
        self.state
    }

    /// Stop receiving keys. Loaded data and cursor position are kept.
    pub fn close(&mut self) {
        if self.open {
            tracing::debug!(navigator = %self.name, "navigator closed");
        }
        self.open = false;
        self.search.clear();
    }

    /// Forget loaded data and the cursor.
    ///
    /// The next [`open`](Self::open) refreshes. An open navigator stays open
    /// and reloads on its next key.
    pub fn clear_data(&mut self) {
        self.levels.clear();
        self.state = LoadState::Uninitialized;
        self.search.clear();
        self.source.clear();
    }

    /// Whether the navigator is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Data lifecycle state.
    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Index of the level the cursor is on, 0 for the top level.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Number of levels this navigator was built with.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// The cursor stack, top level first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Selected entry at the current level.
    pub fn current_index(&self) -> Option<usize> {
        self.levels.last().and_then(|l| l.current)
    }

    /// Path of the selected entry, or `None` if the current level is empty.
    pub fn path(&self) -> Option<Vec<usize>> {
        self.levels.iter().map(|l| l.current).collect()
    }

    /// The type-ahead buffer.
    pub fn search(&self) -> &TypeAheadSearch {
        &self.search
    }

    /// The data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The data source, mutably.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Rebuild level counts after a refresh, clamping selections that no longer fit.
    fn resync_levels(&mut self) {
        let previous: SmallVec<[Level; MAX_LEVELS]> = std::mem::take(&mut self.levels);
        let mut path = Path::new();
        loop {
            let count = self.source.item_count(&path);
            let wanted = previous.get(self.levels.len()).and_then(|l| l.current);
            let current = match (wanted, count) {
                (_, 0) => None,
                (Some(i), n) => Some(i.min(n - 1)),
                (None, _) => Some(0),
            };
            self.levels.push(Level { count, current });
            let Some(i) = current else { break };
            if self.levels.len() >= previous.len() {
                break;
            }
            path.push(i);
        }
    }

    /// Indices of the selected entries on all levels above the current one.
    fn parent_path(&self) -> Path {
        let depth = self.depth();
        self.levels[..depth].iter().filter_map(|l| l.current).collect()
    }

    fn selected_path(&self) -> Option<Path> {
        self.levels.iter().map(|l| l.current).collect()
    }

    fn describe_current(&self) -> String {
        match self.selected_path() {
            None => self.messages.empty.clone(),
            Some(path) => self
                .source
                .describe(&path)
                .unwrap_or_else(|| self.messages.unavailable.clone()),
        }
    }

    fn announce_current(&self) {
        self.speaker.say(&self.describe_current());
    }

    fn set_current(&mut self, current: Option<usize>) {
        if let Some(level) = self.levels.last_mut() {
            level.current = current;
        }
        self.announce_current();
    }

    fn move_wrapped(&mut self, delta: i64) {
        let Some(level) = self.levels.last().copied() else {
            return;
        };
        if level.count == 0 {
            self.speaker.say(&self.messages.empty);
            return;
        }
        self.set_current(step_index(level.current, delta, level.count));
    }

    fn move_clamped(&mut self, delta: i64) {
        let Some(level) = self.levels.last().copied() else {
            return;
        };
        if level.count == 0 {
            self.speaker.say(&self.messages.empty);
            return;
        }
        self.set_current(clamp_step(level.current, delta, level.count));
    }

    fn jump_to(&mut self, last: bool) {
        let Some(level) = self.levels.last().copied() else {
            return;
        };
        if level.count == 0 {
            self.speaker.say(&self.messages.empty);
            return;
        }
        self.set_current(Some(if last { level.count - 1 } else { 0 }));
    }

    fn descend(&mut self) {
        let Some(path) = self.selected_path() else {
            self.speaker.say(&self.messages.empty);
            return;
        };
        if self.levels.len() < self.max_levels && self.source.has_children(&path) {
            let level = Level::new(self.source.item_count(&path));
            self.levels.push(level);
            self.announce_current();
        } else if let Some(utterance) = self.source.activate(&path) {
            self.speaker.say(&utterance);
        }
    }

    /// Returns `false` when the navigator closed and the key should travel on.
    fn ascend(&mut self) -> bool {
        if self.levels.len() > 1 {
            self.levels.pop();
            self.announce_current();
            true
        } else {
            self.close();
            self.clear_data();
            false
        }
    }

    /// Step the parent level while staying at the current depth.
    fn jump_category(&mut self, delta: i64) {
        let depth = self.depth();
        if depth == 0 {
            self.move_wrapped(delta);
            return;
        }
        let parent = self.levels[depth - 1];
        let Some(next) = step_index(parent.current, delta, parent.count) else {
            return;
        };
        self.levels[depth - 1].current = Some(next);
        let path = self.parent_path();
        let count = if self.source.has_children(&path) {
            self.source.item_count(&path)
        } else {
            0
        };
        self.levels[depth] = Level::new(count);
        let heading = self
            .source
            .describe(&path)
            .unwrap_or_else(|| self.messages.unavailable.clone());
        self.speaker.say(&format!("{heading}, {}", self.describe_current()));
    }

    fn type_ahead(&mut self, letter: char) {
        self.search.add_char(letter);
        self.run_search();
    }

    fn run_search(&mut self) {
        if !self.search.has_buffer() {
            return;
        }
        let Some(level) = self.levels.last().copied() else {
            return;
        };
        let mut path = self.parent_path();
        let found = first_prefix_match(self.search.buffer(), level.count, |i| {
            path.push(i);
            let name = self.source.item_name(&path);
            path.pop();
            name
        });
        match found {
            Some(i) => self.set_current(Some(i)),
            None => {
                tracing::debug!(navigator = %self.name, buffer = self.search.buffer(), "type-ahead miss");
                self.speaker.say(&self.messages.no_match);
            }
        }
    }

    fn perform(&mut self, action: Action) -> bool {
        if !matches!(action, Action::Backspace | Action::Repeat) {
            self.search.clear();
        }
        let page = i64::try_from(self.page_size).unwrap_or(i64::MAX);
        match action {
            Action::Up => self.move_wrapped(-1),
            Action::Down => self.move_wrapped(1),
            Action::PageUp => self.move_clamped(-page),
            Action::PageDown => self.move_clamped(page),
            Action::First => self.jump_to(false),
            Action::Last => self.jump_to(true),
            Action::Descend => self.descend(),
            Action::Ascend => return self.ascend(),
            Action::Close => {
                self.close();
                self.clear_data();
                return false;
            }
            Action::PreviousCategory => self.jump_category(-1),
            Action::NextCategory => self.jump_category(1),
            Action::Backspace => {
                self.search.pop_char();
                self.run_search();
            }
            Action::Repeat => self.announce_current(),
            Action::PreviousSubcategory
            | Action::NextSubcategory
            | Action::PreviousGroup
            | Action::NextGroup
            | Action::PreviousItem
            | Action::NextItem
            | Action::MoveCursorToItem
            | Action::ReportDistance
            | Action::Rescan => {}
        }
        true
    }
}

impl<S: NavigatorSource> Handler for HierarchicalNavigator<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.open
    }

    fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Result<bool, HandlerError> {
        if !self.open {
            return Ok(false);
        }
        if self.levels.is_empty() {
            tracing::debug!(navigator = %self.name, "data cleared while open, reloading");
            self.refresh();
        }
        self.search.clear_on_navigation_key(key);
        if let Some(action) = self.bindings.action_for(key, modifiers) {
            return Ok(self.perform(action));
        }
        if let Some(letter) = key.letter()
            && modifiers.is_text()
        {
            self.type_ahead(letter);
        }
        Ok(true)
    }
}
