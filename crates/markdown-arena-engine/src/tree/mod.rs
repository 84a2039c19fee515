//! # Node Arena
//!
//! Dense, index-addressed storage for the AST. Every other component works on
//! this representation.
//!
//! - Nodes live in a single `Vec<Node>`; a [`NodeId`] is the slot index.
//! - Slot 0 is always the synthetic `root`.
//! - Nodes are only ever appended, so after a full parse ascending id order
//!   equals document pre-order.
//! - There is no delete primitive here. The incremental parser removes nodes
//!   by splicing a contiguous id range, which is why ids are not stable across
//!   updates.

pub mod node;
pub mod pool;
pub mod span;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{error::TreeError, index::QueryIndex};

pub use node::{Alignment, DataValue, Node, NodeData, NodeId, NodeKind};
pub use pool::{NodePool, PoolStats};
pub use span::{Position, Shift, Span};

/// Document-level metadata carried alongside the nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeMeta {
    pub source: String,
    pub language: String,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub root: NodeId,
    pub nodes: Vec<Node>,
    pub meta: TreeMeta,
    #[serde(skip)]
    index: Option<QueryIndex>,
}

impl Tree {
    /// Creates a tree holding only the root node, spanning all of `source`.
    pub fn new(language: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let end = Position::ZERO.advance(&source);
        let root = Node::new(NodeData::Root {}, Span::new(Position::ZERO, end));
        Self {
            root: NodeId::ROOT,
            nodes: vec![root],
            meta: TreeMeta {
                source,
                language: language.into(),
                extra: BTreeMap::new(),
            },
            index: None,
        }
    }

    /// Appends `node` at the next free slot and returns its id.
    ///
    /// The caller is responsible for linking the id into its parent's
    /// `children` (see [`Tree::append_child`]).
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// Links `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[self.root.0]
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn source(&self) -> &str {
        &self.meta.source
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: if self.node(id).is_some() {
                vec![id]
            } else {
                vec![]
            },
        }
    }

    /// Concatenated `value` of every text-like node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            match &self.nodes[n.0].data {
                NodeData::Text { value } | NodeData::InlineCode { value } => out.push_str(value),
                NodeData::Break { .. } => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    /// Returns the query index, building it on first access.
    pub fn index(&mut self) -> &QueryIndex {
        let index = match self.index.take() {
            Some(index) => index,
            None => QueryIndex::from_tree(self),
        };
        self.index.insert(index)
    }

    /// The index if one has been built, without building it.
    pub fn cached_index(&self) -> Option<&QueryIndex> {
        self.index.as_ref()
    }

    pub(crate) fn set_index(&mut self, index: QueryIndex) {
        self.index = Some(index);
    }

    /// Drops the cached index. Must be called after mutating `nodes`.
    pub fn invalidate_index(&mut self) {
        self.index = None;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Verifies the arena invariants: slot ids, parent/child symmetry,
    /// reachability and acyclicity. Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), TreeError> {
        let root = self
            .nodes
            .get(self.root.0)
            .filter(|n| n.kind() == NodeKind::Root)
            .ok_or(TreeError::MissingRoot)?;
        if let Some(parent) = root.parent {
            return Err(TreeError::RootHasParent(parent));
        }

        for (slot, node) in self.nodes.iter().enumerate() {
            if node.id.0 != slot {
                return Err(TreeError::IdMismatch { slot, id: node.id });
            }
            for &child in &node.children {
                let Some(c) = self.nodes.get(child.0) else {
                    return Err(TreeError::DanglingChild {
                        parent: node.id,
                        child,
                    });
                };
                if c.parent != Some(node.id) {
                    return Err(TreeError::ParentMismatch {
                        child,
                        listed: node.id,
                        stored: c.parent,
                    });
                }
                let count = node.children.iter().filter(|&&x| x == child).count();
                if count != 1 {
                    return Err(TreeError::DuplicateChild {
                        parent: node.id,
                        child,
                        count,
                    });
                }
            }
        }

        // Symmetry holds in both directions, so every node with a parent is
        // listed exactly once; a walk from the root then proves reachability
        // and rules out cycles.
        let mut seen = vec![false; self.nodes.len()];
        for id in self.descendants(self.root) {
            if std::mem::replace(&mut seen[id.0], true) {
                return Err(TreeError::Unreachable(id));
            }
        }
        if let Some(slot) = seen.iter().position(|s| !s) {
            return Err(TreeError::Unreachable(NodeId(slot)));
        }
        Ok(())
    }

    /// Verifies that ids increase strictly in document pre-order.
    pub fn check_pre_order(&self) -> Result<(), TreeError> {
        let mut last: Option<NodeId> = None;
        for id in self.descendants(self.root) {
            if last.is_some_and(|prev| prev >= id) {
                return Err(TreeError::NotPreOrder(id));
            }
            last = Some(id);
        }
        Ok(())
    }
}

/// Iterator returned by [`Tree::descendants`]. Uses an explicit stack, so
/// deep trees do not grow the call stack.
pub struct Descendants<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.node(id) {
            self.stack.extend(node.children.iter().rev());
        }
        Some(id)
    }
}
