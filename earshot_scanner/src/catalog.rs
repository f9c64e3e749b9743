// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The four-level scan catalog and its builder.

use kurbo::Point;

/// Items closer than this to the reference point are the reference itself.
pub const REFERENCE_EPSILON: f64 = 1e-9;

/// One scannable thing, as reported by a [`ScanSource`](crate::ScanSource).
#[derive(Clone, Debug, PartialEq)]
pub struct ScanEntry {
    /// Top-level grouping, e.g. `"Buildings"`.
    pub category: String,
    /// Second-level grouping, e.g. `"Production"`.
    pub subcategory: String,
    /// Third-level grouping, e.g. `"Mills"`.
    pub group: String,
    /// Spoken name of the item.
    pub name: String,
    /// Map position.
    pub position: Point,
}

impl ScanEntry {
    /// Create an entry.
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
        position: Point,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            group: group.into(),
            name: name.into(),
            position,
        }
    }
}

/// A leaf of the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanItem {
    /// Spoken name.
    pub name: String,
    /// Map position.
    pub position: Point,
    /// Distance from the reference point the catalog was built for.
    pub distance: f64,
}

/// Third level: items sorted by ascending distance.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanGroup {
    /// Spoken name.
    pub name: String,
    /// Items, nearest first.
    pub items: Vec<ScanItem>,
}

/// Second level.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanSubcategory {
    /// Spoken name.
    pub name: String,
    /// Groups in first-seen order.
    pub groups: Vec<ScanGroup>,
}

/// Top level.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanCategory {
    /// Spoken name.
    pub name: String,
    /// Subcategories in first-seen order.
    pub subcategories: Vec<ScanSubcategory>,
}

/// A read-only, distance-sorted projection of the map.
///
/// Categories, subcategories and groups keep the order in which they were
/// first declared or pushed. Items within a group are sorted by ascending
/// distance from [`reference`](Self::reference); equal distances keep push
/// order, so rebuilding from unchanged input yields the same catalog.
///
/// Nodes are addressed by index paths of length 1 to 4.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanCatalog {
    reference: Point,
    categories: Vec<ScanCategory>,
}

impl ScanCatalog {
    /// Start collecting entries.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The point distances were measured from.
    pub fn reference(&self) -> Point {
        self.reference
    }

    /// Top-level categories.
    pub fn categories(&self) -> &[ScanCategory] {
        &self.categories
    }

    /// Total number of items.
    pub fn item_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.subcategories)
            .flat_map(|s| &s.groups)
            .map(|g| g.items.len())
            .sum()
    }

    /// Returns `true` if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of children under `path`; `&[]` counts categories.
    pub fn count(&self, path: &[usize]) -> usize {
        match *path {
            [] => self.categories.len(),
            [c] => self.categories.get(c).map_or(0, |c| c.subcategories.len()),
            [c, s] => self.subcategory(c, s).map_or(0, |s| s.groups.len()),
            [c, s, g] => self.group(c, s, g).map_or(0, |g| g.items.len()),
            _ => 0,
        }
    }

    /// Name of the node at `path`.
    pub fn name(&self, path: &[usize]) -> Option<&str> {
        match *path {
            [c] => self.categories.get(c).map(|c| c.name.as_str()),
            [c, s] => self.subcategory(c, s).map(|s| s.name.as_str()),
            [c, s, g] => self.group(c, s, g).map(|g| g.name.as_str()),
            [c, s, g, i] => self.item(c, s, g, i).map(|i| i.name.as_str()),
            _ => None,
        }
    }

    /// The item at category `c`, subcategory `s`, group `g`, index `i`.
    pub fn item(&self, c: usize, s: usize, g: usize, i: usize) -> Option<&ScanItem> {
        self.group(c, s, g)?.items.get(i)
    }

    fn subcategory(&self, c: usize, s: usize) -> Option<&ScanSubcategory> {
        self.categories.get(c)?.subcategories.get(s)
    }

    fn group(&self, c: usize, s: usize, g: usize) -> Option<&ScanGroup> {
        self.subcategory(c, s)?.groups.get(g)
    }
}

#[derive(Debug)]
struct Pending {
    seq: usize,
    name: String,
    position: Point,
}

#[derive(Debug, Default)]
struct PendingGroup {
    name: String,
    items: Vec<Pending>,
}

#[derive(Debug, Default)]
struct PendingSubcategory {
    name: String,
    groups: Vec<PendingGroup>,
}

#[derive(Debug, Default)]
struct PendingCategory {
    name: String,
    subcategories: Vec<PendingSubcategory>,
}

fn slot<'a, T: Default>(
    list: &'a mut Vec<T>,
    name: &str,
    name_of: impl Fn(&T) -> &str,
    init: impl FnOnce(&mut T),
) -> &'a mut T {
    match list.iter().position(|t| name_of(t) == name) {
        Some(i) => &mut list[i],
        None => {
            let mut t = T::default();
            init(&mut t);
            list.push(t);
            let last = list.len() - 1;
            &mut list[last]
        }
    }
}

/// Collects entries for one rebuild.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<PendingCategory>,
    next_seq: usize,
}

impl CatalogBuilder {
    fn group_mut(&mut self, category: &str, subcategory: &str, group: &str) -> &mut PendingGroup {
        let c = slot(&mut self.categories, category, |c| c.name.as_str(), |c| {
            c.name = category.to_owned();
        });
        let s = slot(&mut c.subcategories, subcategory, |s| s.name.as_str(), |s| {
            s.name = subcategory.to_owned();
        });
        slot(&mut s.groups, group, |g| g.name.as_str(), |g| g.name = group.to_owned())
    }

    /// Make sure a group exists, even if no item lands in it.
    pub fn declare(&mut self, category: &str, subcategory: &str, group: &str) -> &mut Self {
        self.group_mut(category, subcategory, group);
        self
    }

    /// Add one entry.
    pub fn push(&mut self, entry: ScanEntry) -> &mut Self {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.group_mut(&entry.category, &entry.subcategory, &entry.group)
            .items
            .push(Pending {
                seq,
                name: entry.name,
                position: entry.position,
            });
        self
    }

    /// Number of entries pushed so far.
    pub fn len(&self) -> usize {
        self.next_seq
    }

    /// Returns `true` if nothing was pushed.
    pub fn is_empty(&self) -> bool {
        self.next_seq == 0
    }

    /// Measure and sort against `reference`.
    ///
    /// Entries with a non-finite position, or at the reference point itself,
    /// are left out.
    pub fn build(self, reference: Point) -> ScanCatalog {
        let categories = self
            .categories
            .into_iter()
            .map(|c| ScanCategory {
                name: c.name,
                subcategories: c
                    .subcategories
                    .into_iter()
                    .map(|s| ScanSubcategory {
                        name: s.name,
                        groups: s
                            .groups
                            .into_iter()
                            .map(|g| ScanGroup {
                                name: g.name,
                                items: sorted_items(g.items, reference),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        ScanCatalog {
            reference,
            categories,
        }
    }
}

fn sorted_items(pending: Vec<Pending>, reference: Point) -> Vec<ScanItem> {
    let mut measured: Vec<(f64, usize, Pending)> = pending
        .into_iter()
        .filter(|p| p.position.is_finite())
        .map(|p| (p.position.distance(reference), p.seq, p))
        .filter(|(d, _, _)| *d > REFERENCE_EPSILON)
        .collect();
    measured.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    measured
        .into_iter()
        .map(|(distance, _, p)| ScanItem {
            name: p.name,
            position: p.position,
            distance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, x: f64, y: f64) -> ScanEntry {
        ScanEntry::new("Units", "Animals", "Deer", name, Point::new(x, y))
    }

    fn build(entries: &[ScanEntry], reference: Point) -> ScanCatalog {
        let mut builder = ScanCatalog::builder();
        for e in entries {
            builder.push(e.clone());
        }
        builder.build(reference)
    }

    #[test]
    fn sorted_by_distance_excluding_reference() {
        let entries = [entry("A", 0.0, 0.0), entry("B", 3.0, 4.0), entry("C", 1.0, 0.0)];
        let catalog = build(&entries, Point::ORIGIN);
        let items = &catalog.categories()[0].subcategories[0].groups[0].items;
        let order: Vec<(&str, f64)> = items.iter().map(|i| (i.name.as_str(), i.distance)).collect();
        assert_eq!(order, [("C", 1.0), ("B", 5.0)]);
        assert_eq!(build(&entries, Point::ORIGIN), catalog);
    }

    #[test]
    fn ties_keep_push_order() {
        let entries = [entry("east", 2.0, 0.0), entry("north", 0.0, 2.0), entry("west", -2.0, 0.0)];
        let catalog = build(&entries, Point::ORIGIN);
        let names: Vec<&str> = (0..3).filter_map(|i| catalog.name(&[0, 0, 0, i])).collect();
        assert_eq!(names, ["east", "north", "west"]);
    }

    #[test]
    fn non_finite_positions_are_dropped() {
        let entries = [entry("lost", f64::NAN, 1.0), entry("found", 1.0, 1.0)];
        let catalog = build(&entries, Point::ORIGIN);
        assert_eq!(catalog.item_count(), 1);
    }

    #[test]
    fn declared_groups_may_be_empty() {
        let mut builder = ScanCatalog::builder();
        builder
            .declare("Buildings", "Housing", "Huts")
            .push(ScanEntry::new("Resources", "Trees", "Oak", "oak", Point::new(1.0, 1.0)))
            .push(ScanEntry::new("Buildings", "Housing", "Manors", "manor", Point::new(2.0, 0.0)));
        assert_eq!(builder.len(), 2);
        let catalog = builder.build(Point::ORIGIN);
        assert_eq!(catalog.count(&[]), 2);
        assert_eq!(catalog.name(&[0]), Some("Buildings"));
        assert_eq!(catalog.count(&[0, 0]), 2);
        assert_eq!(catalog.count(&[0, 0, 0]), 0);
        assert_eq!(catalog.name(&[0, 0, 1, 0]), Some("manor"));
        assert_eq!(catalog.count(&[7]), 0);
        assert_eq!(catalog.name(&[]), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn groups_are_sorted_and_skip_the_reference(
                points in prop::collection::vec((-50_i32..50, -50_i32..50), 0..40),
                rx in -5_i32..5,
                ry in -5_i32..5,
            ) {
                let reference = Point::new(f64::from(rx), f64::from(ry));
                let mut builder = ScanCatalog::builder();
                for (i, &(x, y)) in points.iter().enumerate() {
                    let group = if i % 2 == 0 { "even" } else { "odd" };
                    builder.push(ScanEntry::new(
                        "Units",
                        "Animals",
                        group,
                        format!("#{i}"),
                        Point::new(f64::from(x), f64::from(y)),
                    ));
                }
                let expected = points
                    .iter()
                    .filter(|&&(x, y)| (x, y) != (rx, ry))
                    .count();
                let catalog = builder.build(reference);
                prop_assert_eq!(catalog.item_count(), expected);
                for group in catalog.categories().iter().flat_map(|c| &c.subcategories).flat_map(|s| &s.groups) {
                    prop_assert!(group.items.iter().all(|i| i.distance > REFERENCE_EPSILON));
                    prop_assert!(group.items.windows(2).all(|w| w[0].distance <= w[1].distance));
                }
            }
        }
    }
}
