// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The spatial scanner handler.

use earshot_announce::Speaker;
use earshot_dispatch::{Action, Handler, HandlerError, Key, KeyBindings, Modifiers};
use earshot_navigator::{Messages, TypeAheadSearch, first_prefix_match, step_index};
use kurbo::Point;

use crate::catalog::{ScanCatalog, ScanItem};
use crate::compass::Compass;
use crate::source::ScanSource;

/// The four scanner levels, outermost first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScanLevel {
    /// Category, e.g. buildings or resources.
    Category,
    /// Subcategory within a category.
    Subcategory,
    /// Group within a subcategory.
    Group,
    /// A single item.
    Item,
}

impl ScanLevel {
    /// Position of this level in the cursor, 0 for categories.
    pub const fn depth(self) -> usize {
        match self {
            Self::Category => 0,
            Self::Subcategory => 1,
            Self::Group => 2,
            Self::Item => 3,
        }
    }
}

const DEPTH: usize = 4;

/// A [`Handler`] that cycles through a distance-sorted [`ScanCatalog`].
///
/// Unlike a navigator, all four levels are reachable at once: each level has
/// its own previous/next actions. Changing an outer level resets every inner
/// level to its first entry. The catalog is rebuilt from the
/// [`ScanSource`] on [`open`](Self::open) and on every rescan, and dropped on
/// close.
///
/// ```rust
/// use earshot_announce::Speaker;
/// use earshot_dispatch::{Handler, Key, Modifiers};
/// use earshot_navigator::Unavailable;
/// use earshot_scanner::{CatalogBuilder, ScanEntry, SpatialScanner};
/// use kurbo::Point;
///
/// let map = |b: &mut CatalogBuilder| -> Result<(), Unavailable> {
///     b.push(ScanEntry::new("Resources", "Trees", "Oak", "oak", Point::new(0.0, 3.0)));
///     b.push(ScanEntry::new("Resources", "Trees", "Oak", "old oak", Point::new(1.0, 0.0)));
///     Ok(())
/// };
/// let (speaker, transcript) = Speaker::recording();
/// let mut scanner = SpatialScanner::new("scanner", map, speaker);
///
/// scanner.open(Point::ORIGIN);
/// scanner.process_key(Key::PageDown, Modifiers::empty()).unwrap();
/// scanner.process_key(Key::End, Modifiers::empty()).unwrap();
/// assert_eq!(
///     transcript.borrow().lines(),
///     ["Resources, old oak", "oak", "3.0 tiles north"],
/// );
/// ```
#[derive(Debug)]
pub struct SpatialScanner<S> {
    name: String,
    source: S,
    catalog: Option<ScanCatalog>,
    reference: Point,
    cursor: [Option<usize>; DEPTH],
    open: bool,
    search: TypeAheadSearch,
    speaker: Speaker,
    bindings: KeyBindings,
    messages: Messages,
    unit: String,
}

impl<S: ScanSource> SpatialScanner<S> {
    /// Create a closed scanner.
    pub fn new(name: impl Into<String>, source: S, speaker: Speaker) -> Self {
        Self {
            name: name.into(),
            source,
            catalog: None,
            reference: Point::ORIGIN,
            cursor: [None; DEPTH],
            open: false,
            search: TypeAheadSearch::new(),
            speaker,
            bindings: KeyBindings::scanner_defaults(),
            messages: Messages::default(),
            unit: String::from("tiles"),
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

    /// Distance unit spoken in reports, `"tiles"` by default.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Open at `reference`, build the catalog and announce the first item.
    pub fn open(&mut self, reference: Point) {
        self.open = true;
        self.cursor = [None; DEPTH];
        self.rebuild(reference);
        self.announce_selection();
    }

    /// Close and drop the catalog.
    pub fn close(&mut self) {
        if self.open {
            tracing::debug!(scanner = %self.name, "scanner closed");
        }
        self.open = false;
        self.catalog = None;
        self.cursor = [None; DEPTH];
        self.search.clear();
    }

    /// Replace the catalog with a fresh scan measured from `reference`.
    ///
    /// Category, subcategory and group selections survive when still in
    /// range and their parent survived; the item selection returns to the
    /// nearest item. Returns the
    /// number of items in the new catalog.
    pub fn rebuild(&mut self, reference: Point) -> usize {
        self.reference = reference;
        let mut builder = ScanCatalog::builder();
        let catalog = match self.source.scan(&mut builder) {
            Ok(()) => builder.build(reference),
            Err(err) => {
                tracing::debug!(scanner = %self.name, %err, "scan source unavailable");
                ScanCatalog::builder().build(reference)
            }
        };
        let items = catalog.item_count();
        tracing::debug!(scanner = %self.name, items, "catalog rebuilt");
        self.catalog = Some(catalog);

        let previous = self.cursor;
        // An inner selection only survives under an unchanged parent.
        let mut parent_kept = true;
        for depth in 0..DEPTH {
            let count = self.count_at(depth);
            let next = match previous[depth] {
                _ if count == 0 => None,
                Some(i) if parent_kept && depth < ScanLevel::Item.depth() && i < count => Some(i),
                _ => Some(0),
            };
            parent_kept = parent_kept && next.is_some() && next == previous[depth];
            self.cursor[depth] = next;
        }
        items
    }

    /// Rebuild from the current reference point and announce the selection.
    pub fn rescan(&mut self) {
        self.rebuild(self.reference);
        self.announce_selection();
    }

    /// Step `level` by `delta`, wrapping, and reset the levels inside it.
    pub fn cycle(&mut self, level: ScanLevel, delta: i64) {
        let depth = level.depth();
        let count = self.count_at(depth);
        if count == 0 {
            let message = if level == ScanLevel::Item {
                &self.messages.unavailable
            } else {
                &self.messages.empty
            };
            self.speaker.say(message);
            return;
        }
        self.cursor[depth] = step_index(self.cursor[depth], delta, count);
        self.reset_inside(depth);
        self.announce_level(depth);
    }

    /// Move the reference point, and the game cursor, to the selected item.
    pub fn move_cursor_to_selected(&mut self) {
        let Some((name, position)) = self.selected_item().map(|i| (i.name.clone(), i.position))
        else {
            self.speaker.say(&self.messages.unavailable);
            return;
        };
        self.reference = position;
        self.source.move_cursor(position);
        self.speaker.say(&name);
    }

    /// Speak distance and direction from the reference point to the selected item.
    pub fn report_selected(&mut self) {
        let report = self.selected_item().map(|item| {
            let delta = item.position - self.reference;
            let distance = delta.hypot();
            match Compass::from_delta(delta) {
                Some(direction) => format!("{distance:.1} {} {direction}", self.unit),
                None => format!("{distance:.1} {}", self.unit),
            }
        });
        match report {
            Some(text) => self.speaker.say(&text),
            None => self.speaker.say(&self.messages.unavailable),
        }
    }

    /// Whether the scanner is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The current reference point.
    pub fn reference(&self) -> Point {
        self.reference
    }

    /// The catalog, while open.
    pub fn catalog(&self) -> Option<&ScanCatalog> {
        self.catalog.as_ref()
    }

    /// Selection at `level`.
    pub fn selection(&self, level: ScanLevel) -> Option<usize> {
        self.cursor[level.depth()]
    }

    /// The selected item, if the leaf level is not empty.
    pub fn selected_item(&self) -> Option<&ScanItem> {
        let [Some(c), Some(s), Some(g), Some(i)] = self.cursor else {
            return None;
        };
        self.catalog.as_ref()?.item(c, s, g, i)
    }

    /// The type-ahead buffer.
    pub fn search(&self) -> &TypeAheadSearch {
        &self.search
    }

    fn path(&self, len: usize) -> Option<Vec<usize>> {
        self.cursor[..len].iter().copied().collect()
    }

    fn count_at(&self, depth: usize) -> usize {
        match (self.catalog.as_ref(), self.path(depth)) {
            (Some(catalog), Some(path)) => catalog.count(&path),
            _ => 0,
        }
    }

    fn reset_inside(&mut self, depth: usize) {
        for inner in depth + 1..DEPTH {
            self.cursor[inner] = (self.count_at(inner) > 0).then_some(0);
        }
    }

    fn name_at(&self, depth: usize) -> Option<String> {
        let path = self.path(depth + 1)?;
        self.catalog.as_ref()?.name(&path).map(str::to_owned)
    }

    fn announce_level(&self, depth: usize) {
        let text = self
            .name_at(depth)
            .unwrap_or_else(|| self.messages.empty.clone());
        self.speaker.say(&text);
    }

    fn announce_selection(&self) {
        let text = match (self.name_at(0), self.selected_item()) {
            (None, _) => self.messages.empty.clone(),
            (Some(category), Some(item)) => format!("{category}, {}", item.name),
            (Some(category), None) => format!("{category}, {}", self.messages.empty),
        };
        self.speaker.say(&text);
    }

    fn repeat(&self) {
        match self.selected_item() {
            Some(item) => self.speaker.say(&item.name),
            None => self.announce_selection(),
        }
    }

    fn type_ahead(&mut self, letter: char) {
        self.search.add_char(letter);
        self.run_search();
    }

    fn run_search(&mut self) {
        if !self.search.has_buffer() {
            return;
        }
        let depth = ScanLevel::Item.depth();
        let count = self.count_at(depth);
        let catalog = self.catalog.as_ref();
        let found = self.path(depth).and_then(|mut path| {
            first_prefix_match(self.search.buffer(), count, |i| {
                path.push(i);
                let name = catalog.and_then(|c| c.name(&path)).map(str::to_owned);
                path.pop();
                name
            })
        });
        match found {
            Some(i) => {
                self.cursor[depth] = Some(i);
                self.announce_level(depth);
            }
            None => self.speaker.say(&self.messages.no_match),
        }
    }

    fn perform(&mut self, action: Action) -> bool {
        if !matches!(action, Action::Backspace | Action::Repeat) {
            self.search.clear();
        }
        match action {
            Action::PreviousCategory => self.cycle(ScanLevel::Category, -1),
            Action::NextCategory => self.cycle(ScanLevel::Category, 1),
            Action::PreviousSubcategory => self.cycle(ScanLevel::Subcategory, -1),
            Action::NextSubcategory => self.cycle(ScanLevel::Subcategory, 1),
            Action::PreviousGroup => self.cycle(ScanLevel::Group, -1),
            Action::NextGroup => self.cycle(ScanLevel::Group, 1),
            Action::PreviousItem | Action::Up => self.cycle(ScanLevel::Item, -1),
            Action::NextItem | Action::Down => self.cycle(ScanLevel::Item, 1),
            Action::MoveCursorToItem => self.move_cursor_to_selected(),
            Action::ReportDistance => self.report_selected(),
            Action::Rescan => self.rescan(),
            Action::Close | Action::Ascend => {
                self.close();
                return false;
            }
            Action::Backspace => {
                self.search.pop_char();
                self.run_search();
            }
            Action::Repeat => self.repeat(),
            Action::Descend
            | Action::PageUp
            | Action::PageDown
            | Action::First
            | Action::Last => {}
        }
        true
    }
}

impl<S: ScanSource> Handler for SpatialScanner<S> {
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
        if self.catalog.is_none() {
            return Err(HandlerError::InvalidState(format!(
                "scanner `{}` is open without a catalog",
                self.name
            )));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, ScanEntry};
    use earshot_announce::Transcript;
    use earshot_navigator::Unavailable;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Map = Rc<RefCell<Vec<ScanEntry>>>;

    fn map_source(map: &Map) -> impl FnMut(&mut CatalogBuilder) -> Result<(), Unavailable> + 'static {
        let map = Rc::clone(map);
        move |b: &mut CatalogBuilder| {
            b.declare("Buildings", "Housing", "Huts");
            for e in map.borrow().iter() {
                b.push(e.clone());
            }
            Ok(())
        }
    }

    fn village() -> Map {
        Rc::new(RefCell::new(vec![
            ScanEntry::new("Resources", "Trees", "Oak", "far oak", Point::new(0.0, 10.0)),
            ScanEntry::new("Resources", "Trees", "Oak", "near oak", Point::new(2.0, 0.0)),
            ScanEntry::new("Resources", "Trees", "Pine", "pine", Point::new(-1.0, -1.0)),
            ScanEntry::new("Resources", "Stone", "Quarry", "quarry", Point::new(5.0, 5.0)),
            ScanEntry::new("Units", "Animals", "Deer", "deer", Point::new(-4.0, 0.0)),
        ]))
    }

    const NONE: Modifiers = Modifiers::empty();

    fn scanner(
        map: &Map,
    ) -> (
        SpatialScanner<impl FnMut(&mut CatalogBuilder) -> Result<(), Unavailable>>,
        Rc<RefCell<Transcript>>,
    ) {
        let (speaker, transcript) = Speaker::recording();
        let mut s = SpatialScanner::new("scanner", map_source(map), speaker);
        s.open(Point::ORIGIN);
        (s, transcript)
    }

    fn last(transcript: &Rc<RefCell<Transcript>>) -> String {
        transcript.borrow().last().unwrap_or_default().to_owned()
    }

    #[test]
    fn opens_on_first_category_and_nearest_item() {
        let map = village();
        let (s, transcript) = scanner(&map);
        // "Buildings" is declared first and has no items.
        assert_eq!(last(&transcript), "Buildings, empty");
        assert_eq!(s.selection(ScanLevel::Category), Some(0));
        assert_eq!(s.selection(ScanLevel::Item), None);
    }

    #[test]
    fn empty_leaf_actions_announce_unavailable() {
        let map = village();
        let (mut s, transcript) = scanner(&map);
        assert!(s.process_key(Key::Home, NONE).unwrap());
        assert_eq!(last(&transcript), "not available");
        assert!(s.process_key(Key::End, NONE).unwrap());
        assert_eq!(last(&transcript), "not available");
        assert!(s.process_key(Key::PageDown, NONE).unwrap());
        assert_eq!(last(&transcript), "not available");
        assert_eq!(s.reference(), Point::ORIGIN);
    }

    #[test]
    fn outer_levels_reset_inner_ones() {
        let map = village();
        let (mut s, transcript) = scanner(&map);
        s.process_key(Key::PageDown, Modifiers::CTRL).unwrap();
        assert_eq!(last(&transcript), "Resources");
        assert_eq!(s.selected_item().map(|i| i.name.as_str()), Some("near oak"));
        s.process_key(Key::PageDown, NONE).unwrap();
        assert_eq!(last(&transcript), "far oak");
        s.process_key(Key::PageDown, Modifiers::ALT).unwrap();
        assert_eq!(last(&transcript), "Pine");
        assert_eq!(s.selection(ScanLevel::Item), Some(0));
        s.process_key(Key::PageDown, Modifiers::SHIFT).unwrap();
        assert_eq!(last(&transcript), "Stone");
        assert_eq!(s.selection(ScanLevel::Group), Some(0));
        assert_eq!(s.selected_item().map(|i| i.name.as_str()), Some("quarry"));
        // Category wraps around.
        s.process_key(Key::PageUp, Modifiers::CTRL).unwrap();
        s.process_key(Key::PageUp, Modifiers::CTRL).unwrap();
        assert_eq!(last(&transcript), "Units");
    }

    #[test]
    fn report_and_move_cursor() {
        let map = village();
        let (mut s, transcript) = scanner(&map);
        s.cycle(ScanLevel::Category, 1);
        s.process_key(Key::End, NONE).unwrap();
        assert_eq!(last(&transcript), "2.0 tiles east");
        s.process_key(Key::PageDown, NONE).unwrap();
        s.process_key(Key::End, NONE).unwrap();
        assert_eq!(last(&transcript), "10.0 tiles north");
        s.process_key(Key::Home, NONE).unwrap();
        assert_eq!(s.reference(), Point::new(0.0, 10.0));
        assert_eq!(last(&transcript), "far oak");
        s.process_key(Key::End, NONE).unwrap();
        assert_eq!(last(&transcript), "0.0 tiles");
    }

    #[test]
    fn rescan_keeps_outer_selection_and_resets_item() {
        let map = village();
        let (mut s, _) = scanner(&map);
        s.cycle(ScanLevel::Category, 1);
        s.cycle(ScanLevel::Item, 1);
        assert_eq!(s.selection(ScanLevel::Item), Some(1));
        map.borrow_mut().push(ScanEntry::new("Resources", "Trees", "Oak", "sapling", Point::new(0.5, 0.0)));
        s.process_key(Key::Function(5), NONE).unwrap();
        assert_eq!(s.selection(ScanLevel::Category), Some(1));
        assert_eq!(s.selection(ScanLevel::Item), Some(0));
        assert_eq!(s.selected_item().map(|i| i.name.as_str()), Some("sapling"));
    }

    #[test]
    fn rescan_clamps_vanished_categories() {
        let map = village();
        let (mut s, _) = scanner(&map);
        s.cycle(ScanLevel::Category, -1);
        assert_eq!(s.selection(ScanLevel::Category), Some(2));
        map.borrow_mut().retain(|e| e.category != "Units");
        s.rescan();
        assert_eq!(s.selection(ScanLevel::Category), Some(0));
    }

    #[test]
    fn rescan_resets_inner_levels_under_a_clamped_category() {
        let map = village();
        map.borrow_mut().extend([
            ScanEntry::new("Units", "Herds", "Sheep", "sheep", Point::new(3.0, 3.0)),
            ScanEntry::new("Units", "Herds", "Goats", "goat", Point::new(3.0, -3.0)),
            ScanEntry::new("Buildings", "Housing", "Lodges", "lodge", Point::new(0.0, 2.0)),
            ScanEntry::new("Buildings", "Workshops", "Mills", "mill", Point::new(1.0, 1.0)),
        ]);
        let (mut s, transcript) = scanner(&map);
        s.cycle(ScanLevel::Category, -1);
        s.cycle(ScanLevel::Subcategory, 1);
        s.cycle(ScanLevel::Group, 1);
        assert_eq!(last(&transcript), "Goats");
        assert_eq!(s.selection(ScanLevel::Subcategory), Some(1));
        assert_eq!(s.selection(ScanLevel::Group), Some(1));

        map.borrow_mut().retain(|e| e.category != "Units");
        s.rescan();
        assert_eq!(s.selection(ScanLevel::Category), Some(0));
        assert_eq!(s.selection(ScanLevel::Subcategory), Some(0));
        assert_eq!(s.selection(ScanLevel::Group), Some(0));
        assert_eq!(s.selection(ScanLevel::Item), None);
        assert_eq!(last(&transcript), "Buildings, empty");
    }

    #[test]
    fn type_ahead_on_item_names() {
        let map = village();
        let (mut s, transcript) = scanner(&map);
        s.cycle(ScanLevel::Category, 1);
        s.process_key(Key::Char('f'), NONE).unwrap();
        assert_eq!(s.selection(ScanLevel::Item), Some(1));
        assert_eq!(last(&transcript), "far oak");
        s.process_key(Key::Char('x'), NONE).unwrap();
        assert_eq!(last(&transcript), "no match");
        s.process_key(Key::Backspace, NONE).unwrap();
        assert_eq!(s.search().buffer(), "f");
    }

    #[test]
    fn escape_closes_and_passes_through() {
        let map = village();
        let (mut s, _) = scanner(&map);
        assert!(!s.process_key(Key::Escape, NONE).unwrap());
        assert!(!s.is_open());
        assert!(s.catalog().is_none());
        assert!(!s.process_key(Key::PageDown, NONE).unwrap());
    }

    #[test]
    fn unavailable_source_opens_empty() {
        let (speaker, transcript) = Speaker::recording();
        let source = |_: &mut CatalogBuilder| -> Result<(), Unavailable> { Err(Unavailable) };
        let mut s = SpatialScanner::new("scanner", source, speaker);
        s.open(Point::ORIGIN);
        assert!(s.is_open());
        assert_eq!(last(&transcript), "empty");
        s.process_key(Key::PageDown, Modifiers::CTRL).unwrap();
        assert_eq!(last(&transcript), "empty");
    }
}
