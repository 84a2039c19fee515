//! Error types.
//!
//! Malformed Markdown is never an error: the tokenizers always fall back to a
//! less specific token. Everything here is either option validation (rejected
//! before any work starts) or an API sequencing mistake.

use thiserror::Error;

use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("batch_size must be between 1 and 128, got {0}")]
    BatchSize(usize),

    #[error("incremental threshold must be in (0, 1], got {0}")]
    Threshold(f64),

    #[error("stream high_water_mark must be greater than zero")]
    HighWaterMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("query index has not been built (call build() or rebuild() first)")]
    NotBuilt,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncrementalError {
    #[error("no document has been parsed yet (call parse() before editing)")]
    NotParsed,

    #[error("edit range {start}..{end} is outside the document (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plugin `{plugin}` failed: {message}")]
pub struct PluginError {
    pub plugin: String,
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("plugin `{plugin}` is asynchronous; use parse_async instead")]
    AsyncPluginInSyncParse { plugin: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node type `{0}`")]
pub struct UnknownNodeKind(pub String);

/// A structural invariant violated by a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root slot is missing or is not a root node")]
    MissingRoot,

    #[error("node at slot {slot} stores id {id}")]
    IdMismatch { slot: usize, id: NodeId },

    #[error("root node has parent {0}")]
    RootHasParent(NodeId),

    #[error("{parent} lists child {child} which does not exist")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("{child} is listed under {listed} but stores parent {stored:?}")]
    ParentMismatch {
        child: NodeId,
        listed: NodeId,
        stored: Option<NodeId>,
    },

    #[error("{child} appears {count} times in the children of {parent}")]
    DuplicateChild {
        parent: NodeId,
        child: NodeId,
        count: usize,
    },

    #[error("{0} is not reachable from the root")]
    Unreachable(NodeId),

    #[error("{0} was allocated before a node that precedes it in document order")]
    NotPreOrder(NodeId),
}
