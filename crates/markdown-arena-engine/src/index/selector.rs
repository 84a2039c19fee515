use serde::{Deserialize, Serialize};

use crate::tree::{DataValue, NodeId, NodeKind};

/// Depth constraint of a [`Selector`]. The root is at depth 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepthFilter {
    Exact(usize),
    /// Inclusive on both ends.
    Range { min: usize, max: usize },
}

impl DepthFilter {
    pub fn matches(self, depth: usize) -> bool {
        match self {
            DepthFilter::Exact(d) => depth == d,
            DepthFilter::Range { min, max } => (min..=max).contains(&depth),
        }
    }
}

/// Child count constraint of a [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChildCount {
    Exact(usize),
    Between {
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl ChildCount {
    pub fn matches(self, count: usize) -> bool {
        match self {
            ChildCount::Exact(n) => count == n,
            ChildCount::Between { min, max } => {
                min.is_none_or(|m| count >= m) && max.is_none_or(|m| count <= m)
            }
        }
    }
}

/// A conjunction of structural filters, evaluated by
/// [`QueryIndex::query`](super::QueryIndex::query).
///
/// An empty selector matches every node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selector {
    /// Node is any one of these kinds. Empty means any kind.
    pub kinds: Vec<NodeKind>,
    pub depth: Option<DepthFilter>,
    pub parent: Option<NodeId>,
    /// Every `(key, value)` pair must match.
    pub data: Vec<(String, DataValue)>,
    pub has_children: Option<bool>,
    pub child_count: Option<ChildCount>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: NodeKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(DepthFilter::Exact(depth));
        self
    }

    pub fn depth_range(mut self, min: usize, max: usize) -> Self {
        self.depth = Some(DepthFilter::Range { min, max });
        self
    }

    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    pub fn has_children(mut self, yes: bool) -> Self {
        self.has_children = Some(yes);
        self
    }

    pub fn child_count(mut self, n: usize) -> Self {
        self.child_count = Some(ChildCount::Exact(n));
        self
    }

    pub fn child_count_between(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.child_count = Some(ChildCount::Between { min, max });
        self
    }
}
