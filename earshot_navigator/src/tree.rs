// Copyright 2025 the Earshot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Labelled trees and a [`NavigatorSource`] over them.

use std::fmt;
use std::rc::Rc;

use crate::provider::{EntityId, GameDataProvider, Unavailable};
use crate::source::NavigatorSource;

/// One labelled entry in a navigation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Spoken label, also used for type-ahead.
    pub label: String,
    /// Child entries.
    pub children: Vec<Node>,
    /// Whether the entry can be entered even when it has no children.
    pub expandable: bool,
}

impl Node {
    /// An entry that cannot be entered.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            expandable: false,
        }
    }

    /// An enterable entry. `children` may be empty.
    pub fn branch(label: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            children,
            expandable: true,
        }
    }

    /// A branch whose children are leaves with the given labels.
    pub fn list<I, S>(label: impl Into<String>, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::branch(label, leaves.into_iter().map(Self::leaf).collect())
    }
}

fn node_at<'a>(roots: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (&first, rest) = path.split_first()?;
    let mut node = roots.get(first)?;
    for &i in rest {
        node = node.children.get(i)?;
    }
    Some(node)
}

type Loader = Box<dyn FnMut() -> Result<Vec<Node>, Unavailable>>;
type Activate = Box<dyn FnMut(&[usize], &Node) -> Option<String>>;

/// A [`NavigatorSource`] backed by a tree of [`Node`]s.
///
/// The loader runs on every refresh and replaces the whole tree.
///
/// ```rust
/// use earshot_navigator::{Node, NavigatorSource, TreeSource};
///
/// let mut menu = TreeSource::fixed(vec![
///     Node::list("Resources", ["Wood", "Stone"]),
///     Node::branch("Villagers", Vec::new()),
/// ]);
/// menu.refresh().unwrap();
/// assert_eq!(menu.item_count(&[]), 2);
/// assert_eq!(menu.item_name(&[0, 1]).as_deref(), Some("Stone"));
/// assert!(menu.has_children(&[1]));
/// assert_eq!(menu.item_count(&[1]), 0);
/// ```
pub struct TreeSource {
    loader: Loader,
    on_activate: Option<Activate>,
    roots: Vec<Node>,
}

impl fmt::Debug for TreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSource")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl TreeSource {
    /// A source that calls `loader` on every refresh.
    pub fn new(loader: impl FnMut() -> Result<Vec<Node>, Unavailable> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            on_activate: None,
            roots: Vec::new(),
        }
    }

    /// A source over a fixed tree, such as a static menu.
    pub fn fixed(roots: Vec<Node>) -> Self {
        Self::new(move || Ok(roots.clone()))
    }

    /// A source over the sections of one entity, fetched through `context`.
    pub fn from_snapshot<P>(context: Rc<P>, kind: impl Into<String>, id: EntityId) -> Self
    where
        P: GameDataProvider + ?Sized + 'static,
    {
        let kind = kind.into();
        Self::new(move || context.fetch_snapshot(&kind, id).map(|s| s.sections))
    }

    /// Call `f` when a leaf is activated; its return value is spoken.
    #[must_use]
    pub fn on_activate(
        mut self,
        f: impl FnMut(&[usize], &Node) -> Option<String> + 'static,
    ) -> Self {
        self.on_activate = Some(Box::new(f));
        self
    }

    /// The tree loaded by the last refresh.
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }
}

impl NavigatorSource for TreeSource {
    fn refresh(&mut self) -> Result<(), Unavailable> {
        match (self.loader)() {
            Ok(roots) => {
                self.roots = roots;
                Ok(())
            }
            Err(err) => {
                self.roots.clear();
                Err(err)
            }
        }
    }

    fn item_count(&self, path: &[usize]) -> usize {
        if path.is_empty() {
            return self.roots.len();
        }
        node_at(&self.roots, path).map_or(0, |n| n.children.len())
    }

    fn item_name(&self, path: &[usize]) -> Option<String> {
        node_at(&self.roots, path).map(|n| n.label.clone())
    }

    fn has_children(&self, path: &[usize]) -> bool {
        node_at(&self.roots, path).is_some_and(|n| n.expandable || !n.children.is_empty())
    }

    fn activate(&mut self, path: &[usize]) -> Option<String> {
        let node = node_at(&self.roots, path)?;
        self.on_activate.as_mut().and_then(|f| f(path, node))
    }

    fn clear(&mut self) {
        self.roots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GameContext, Snapshot};

    struct Buildings;

    impl GameDataProvider for Buildings {
        fn fetch_snapshot(&self, kind: &str, id: EntityId) -> Result<Snapshot, Unavailable> {
            Ok(Snapshot {
                kind: kind.to_owned(),
                id,
                sections: vec![Node::list("Workers", ["Ada", "Grace"])],
            })
        }
    }

    #[test]
    fn out_of_range_paths_are_empty() {
        let mut src = TreeSource::fixed(vec![Node::leaf("Only")]);
        src.refresh().unwrap();
        assert_eq!(src.item_count(&[4]), 0);
        assert_eq!(src.item_name(&[0, 0]), None);
        assert!(!src.has_children(&[0]));
    }

    #[test]
    fn snapshot_source_follows_context_lifecycle() {
        let ctx = Rc::new(GameContext::new(Buildings));
        let mut src = TreeSource::from_snapshot(Rc::clone(&ctx), "building", EntityId(9));
        src.refresh().unwrap();
        assert_eq!(src.item_name(&[0, 1]).as_deref(), Some("Grace"));

        ctx.invalidate();
        assert_eq!(src.refresh(), Err(Unavailable));
        assert!(src.roots().is_empty());
    }

    #[test]
    fn activation_reports_the_node() {
        let mut src = TreeSource::fixed(vec![Node::leaf("Save")])
            .on_activate(|path, node| Some(format!("{} {:?}", node.label, path)));
        src.refresh().unwrap();
        assert_eq!(src.activate(&[0]).as_deref(), Some("Save [0]"));
        assert_eq!(src.activate(&[3]), None);
    }
}
