use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{Node, NodeData, NodeKind, Span, Tree};

/// Upper bound on idle nodes retained per kind.
pub const DEFAULT_POOL_CAPACITY: usize = 4096;

/// Counters describing pool traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Nodes handed out by [`NodePool::acquire`].
    pub acquired: usize,
    /// Of those, how many came from the free list rather than a fresh allocation.
    pub reused: usize,
    /// Nodes returned through [`NodePool::release`].
    pub released: usize,
}

/// Free lists of reset nodes keyed by kind.
///
/// A pool is owned by one parser (or handed to one by the caller) and is not
/// shared behind the caller's back. Releasing resets every field, so a reused
/// node is indistinguishable from a fresh one.
#[derive(Debug)]
pub struct NodePool {
    free: FxHashMap<NodeKind, Vec<Node>>,
    capacity: usize,
    stats: PoolStats,
}

impl Default for NodePool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: FxHashMap::default(),
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Hands out a blank node of `kind`.
    pub fn acquire(&mut self, kind: NodeKind) -> Node {
        self.stats.acquired += 1;
        match self.free.get_mut(&kind).and_then(Vec::pop) {
            Some(node) => {
                self.stats.reused += 1;
                node
            }
            None => Node::new(NodeData::empty(kind), Span::default()),
        }
    }

    /// Resets `node` and keeps it for a later [`NodePool::acquire`] of the same kind.
    pub fn release(&mut self, mut node: Node) {
        self.stats.released += 1;
        let kind = node.kind();
        let list = self.free.entry(kind).or_default();
        if list.len() < self.capacity {
            node.reset(kind);
            list.push(node);
        }
    }

    /// Releases every node of `tree`.
    pub fn release_tree(&mut self, tree: Tree) {
        let before = self.stats.released;
        for node in tree.nodes {
            self.release(node);
        }
        log::trace!(
            "pool: released {} nodes, {} idle",
            self.stats.released - before,
            self.available()
        );
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Idle nodes across all kinds.
    pub fn available(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    pub fn available_of(&self, kind: NodeKind) -> usize {
        self.free.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}
