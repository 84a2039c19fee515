//! # Query Index
//!
//! Secondary indexes over one tree snapshot:
//!
//! - kind → ids
//! - data `(key, value)` → ids
//! - parent → children, child → parent
//! - depth → ids
//!
//! The index is derived state. It is built in one pre-order pass, is never
//! updated in place, and goes stale as soon as the tree's nodes change;
//! [`QueryIndex::rebuild`] is the only way to refresh it. Result sets keep
//! insertion order, which is pre-order for a freshly parsed tree but is not
//! promised in general: sort by id when document order matters.

pub mod selector;

use std::collections::BTreeMap;

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::IndexError;
use crate::tree::{DataValue, NodeId, NodeKind, Tree};

pub use selector::{ChildCount, DepthFilter, Selector};

type IdSet = IndexSet<NodeId, FxBuildHasher>;

#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    by_type: FxHashMap<NodeKind, IdSet>,
    by_data: FxHashMap<&'static str, FxHashMap<DataValue, IdSet>>,
    children: FxHashMap<NodeId, IdSet>,
    parents: FxHashMap<NodeId, NodeId>,
    by_depth: BTreeMap<usize, IdSet>,
    depths: FxHashMap<NodeId, usize>,
    built: bool,
}

impl QueryIndex {
    /// An empty, unbuilt index. Every lookup fails until [`QueryIndex::build`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over `tree`.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut index = Self::new();
        index.build(tree);
        index
    }

    /// Populates every map in one pre-order walk from the root.
    pub fn build(&mut self, tree: &Tree) {
        let mut stack = vec![(tree.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = tree.node(id) else { continue };

            self.by_type.entry(node.kind()).or_default().insert(id);
            for (key, value) in node.data.fields() {
                self.by_data
                    .entry(key)
                    .or_default()
                    .entry(value)
                    .or_default()
                    .insert(id);
            }
            if let Some(parent) = node.parent {
                self.parents.insert(id, parent);
            }
            if !node.children.is_empty() {
                self.children
                    .insert(id, node.children.iter().copied().collect());
            }
            self.by_depth.entry(depth).or_default().insert(id);
            self.depths.insert(id, depth);

            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        self.built = true;
        log::debug!(
            "query index built: {} nodes, {} kinds, {} data keys, max depth {}",
            self.depths.len(),
            self.by_type.len(),
            self.by_data.len(),
            self.by_depth.keys().next_back().copied().unwrap_or_default()
        );
    }

    /// Clears and builds again. The only way to pick up tree changes.
    pub fn rebuild(&mut self, tree: &Tree) {
        self.clear();
        self.build(tree);
    }

    /// Drops every entry. Lookups fail until the next build.
    pub fn clear(&mut self) {
        self.by_type.clear();
        self.by_data.clear();
        self.children.clear();
        self.parents.clear();
        self.by_depth.clear();
        self.depths.clear();
        self.built = false;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    fn ensure_built(&self) -> Result<(), IndexError> {
        if self.built {
            Ok(())
        } else {
            Err(IndexError::NotBuilt)
        }
    }

    pub fn find_by_type(&self, kind: NodeKind) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(collect(self.by_type.get(&kind)))
    }

    /// Union over `kinds`, in the order the kinds are given.
    pub fn find_by_types(&self, kinds: &[NodeKind]) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(self.union_types(kinds).into_iter().collect())
    }

    pub fn find_by_data(
        &self,
        key: &str,
        value: impl Into<DataValue>,
    ) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(collect(self.data_set(key, &value.into())))
    }

    pub fn find_children(&self, id: NodeId) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(collect(self.children.get(&id)))
    }

    pub fn find_parent(&self, id: NodeId) -> Result<Option<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(self.parents.get(&id).copied())
    }

    pub fn find_by_depth(&self, depth: usize) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        Ok(collect(self.by_depth.get(&depth)))
    }

    /// Nodes with `min <= depth <= max`, shallowest first.
    pub fn find_by_depth_range(&self, min: usize, max: usize) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;
        if min > max {
            return Ok(Vec::new());
        }
        Ok(self
            .by_depth
            .range(min..=max)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect())
    }

    pub fn depth_of(&self, id: NodeId) -> Result<Option<usize>, IndexError> {
        self.ensure_built()?;
        Ok(self.depths.get(&id).copied())
    }

    /// Evaluates `selector`.
    ///
    /// Candidates come from the most selective available filter (kind, then
    /// depth, then parent, then data). The remaining filters are applied as
    /// set lookups, and the child predicates last.
    pub fn query(&self, selector: &Selector) -> Result<Vec<NodeId>, IndexError> {
        self.ensure_built()?;

        let (seed, candidates): (Seed, Vec<NodeId>) = if !selector.kinds.is_empty() {
            (Seed::Kind, self.union_types(&selector.kinds).into_iter().collect())
        } else if let Some(depth) = selector.depth {
            let ids = match depth {
                DepthFilter::Exact(d) => collect(self.by_depth.get(&d)),
                DepthFilter::Range { min, max } if min <= max => self
                    .by_depth
                    .range(min..=max)
                    .flat_map(|(_, ids)| ids.iter().copied())
                    .collect(),
                DepthFilter::Range { .. } => Vec::new(),
            };
            (Seed::Depth, ids)
        } else if let Some(parent) = selector.parent {
            (Seed::Parent, collect(self.children.get(&parent)))
        } else if let Some((key, value)) = selector.data.first() {
            (Seed::Data, collect(self.data_set(key, value)))
        } else {
            (
                Seed::All,
                self.by_depth
                    .values()
                    .flat_map(|ids| ids.iter().copied())
                    .collect(),
            )
        };

        let data_sets: Vec<Option<&IdSet>> = selector
            .data
            .iter()
            .skip(usize::from(seed == Seed::Data))
            .map(|(key, value)| self.data_set(key, value))
            .collect();

        let result = candidates
            .into_iter()
            .filter(|id| {
                seed == Seed::Depth
                    || selector
                        .depth
                        .is_none_or(|f| self.depths.get(id).is_some_and(|&d| f.matches(d)))
            })
            .filter(|id| {
                matches!(seed, Seed::Parent)
                    || selector
                        .parent
                        .is_none_or(|p| self.parents.get(id) == Some(&p))
            })
            .filter(|id| data_sets.iter().all(|set| set.is_some_and(|s| s.contains(id))))
            .filter(|id| {
                let count = self.children.get(id).map_or(0, IndexSet::len);
                selector.has_children.is_none_or(|yes| (count > 0) == yes)
                    && selector.child_count.is_none_or(|f| f.matches(count))
            })
            .collect();
        Ok(result)
    }

    fn union_types(&self, kinds: &[NodeKind]) -> IdSet {
        let mut out = IdSet::default();
        for kind in kinds {
            if let Some(ids) = self.by_type.get(kind) {
                out.extend(ids.iter().copied());
            }
        }
        out
    }

    fn data_set(&self, key: &str, value: &DataValue) -> Option<&IdSet> {
        self.by_data.get(key)?.get(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seed {
    Kind,
    Depth,
    Parent,
    Data,
    All,
}

fn collect(set: Option<&IdSet>) -> Vec<NodeId> {
    set.map(|s| s.iter().copied().collect()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use pretty_assertions::assert_eq;

    const DOC: &str = "# Title\n\nSome *text* here.\n\n## Sub\n\n- [x] done\n- [ ] todo\n";

    fn index() -> (Tree, QueryIndex) {
        let tree = parse(DOC);
        let index = QueryIndex::from_tree(&tree);
        (tree, index)
    }

    #[test]
    fn unbuilt_index_fails_fast() {
        let index = QueryIndex::new();
        assert_eq!(
            index.find_by_type(NodeKind::Heading),
            Err(IndexError::NotBuilt)
        );
        assert_eq!(index.query(&Selector::new()), Err(IndexError::NotBuilt));
    }

    #[test]
    fn cleared_index_fails_fast() {
        let (_, mut index) = index();
        index.clear();
        assert!(!index.is_built());
        assert_eq!(index.find_parent(NodeId(1)), Err(IndexError::NotBuilt));
    }

    #[test]
    fn type_counts_match_tree() {
        let (tree, index) = index();
        for kind in NodeKind::ALL {
            let expected = tree.nodes.iter().filter(|n| n.kind() == kind).count();
            assert_eq!(index.find_by_type(kind).unwrap().len(), expected, "{kind}");
        }
        assert_eq!(index.len(), tree.len());
    }

    #[test]
    fn data_lookup() {
        let (tree, index) = index();
        let h2 = index.find_by_data("depth", 2u8).unwrap();
        assert_eq!(h2.len(), 1);
        assert_eq!(tree.text_content(h2[0]), "Sub");
        assert_eq!(index.find_by_data("checked", true).unwrap().len(), 1);
        assert_eq!(index.find_by_data("checked", false).unwrap().len(), 1);
        assert!(index.find_by_data("nope", 1i64).unwrap().is_empty());
    }

    #[test]
    fn structure_lookups() {
        let (tree, index) = index();
        let top = index.find_children(NodeId::ROOT).unwrap();
        assert_eq!(top, tree.root_node().children);
        for &id in &top {
            assert_eq!(index.find_parent(id).unwrap(), Some(NodeId::ROOT));
            assert_eq!(index.depth_of(id).unwrap(), Some(1));
        }
        assert_eq!(index.find_parent(NodeId::ROOT).unwrap(), None);
        assert_eq!(index.find_by_depth(0).unwrap(), vec![NodeId::ROOT]);
        assert_eq!(index.find_by_depth(1).unwrap(), top);
    }

    #[test]
    fn depth_range_is_shallowest_first() {
        let (_, index) = index();
        let ids = index.find_by_depth_range(0, 1).unwrap();
        assert_eq!(ids[0], NodeId::ROOT);
        assert_eq!(ids.len(), 1 + index.find_by_depth(1).unwrap().len());
        assert!(index.find_by_depth_range(3, 1).unwrap().is_empty());
    }

    #[test]
    fn query_combines_filters() {
        let (tree, index) = index();
        let headings = index
            .query(&Selector::new().kind(NodeKind::Heading).data("depth", 1u8))
            .unwrap();
        assert_eq!(headings.len(), 1);
        assert_eq!(tree.text_content(headings[0]), "Title");

        let with_emphasis = index
            .query(&Selector::new().depth(1).child_count_between(Some(3), None))
            .unwrap();
        assert_eq!(with_emphasis.len(), 1);
        assert_eq!(tree.nodes[with_emphasis[0].0].kind(), NodeKind::Paragraph);

        let leaves = index
            .query(&Selector::new().parent(NodeId::ROOT).has_children(false))
            .unwrap();
        assert!(leaves.is_empty());

        let texts_in_items = index
            .query(&Selector::new().kind(NodeKind::Text).depth(2).data("value", "done"))
            .unwrap();
        assert_eq!(texts_in_items.len(), 1);
    }

    #[test]
    fn empty_selector_matches_everything() {
        let (tree, index) = index();
        assert_eq!(index.query(&Selector::new()).unwrap().len(), tree.len());
    }

    #[test]
    fn rebuild_picks_up_changes() {
        let (mut tree, mut index) = index();
        let first = tree.root_node().children[0];
        if let Some(node) = tree.node_mut(first) {
            node.data = crate::tree::NodeData::Heading {
                depth: 3,
                setext: false,
            };
        }
        assert!(index.find_by_data("depth", 3u8).unwrap().is_empty());
        index.rebuild(&tree);
        assert_eq!(index.find_by_data("depth", 3u8).unwrap(), vec![first]);
    }
}
