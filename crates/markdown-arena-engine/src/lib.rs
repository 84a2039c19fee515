//! Arena-backed CommonMark/GFM parser.
//!
//! A document is tokenized into block tokens, each block's text into inline
//! tokens, and the result lowered into a flat [`Tree`] of nodes addressed by
//! [`NodeId`]. On top of that sit an opt-in [`QueryIndex`], an
//! [`IncrementalParser`] that splices re-parsed regions into an existing tree,
//! and a [`StreamingParser`] for chunked input.

pub mod error;
pub mod incremental;
pub mod index;
pub mod parsing;
pub mod stream;
pub mod tree;

// Re-export key types for easier usage
pub use error::{
    IncrementalError, IndexError, OptionsError, ParseError, PluginError, TreeError,
    UnknownNodeKind,
};
pub use incremental::{
    Edit, EditInput, IncrementalConfig, IncrementalParser, IncrementalStats, SimpleEdit,
    detect_edit, should_use_incremental,
};
pub use index::{ChildCount, DepthFilter, QueryIndex, Selector};
pub use parsing::{ParseOptions, Parser, Plugin, PluginFuture, Transform, parse, parse_async, parse_with};
pub use stream::{StreamEvent, StreamOptions, StreamingParser};
pub use tree::{
    Alignment, DataValue, Node, NodeData, NodeId, NodeKind, NodePool, PoolStats, Position, Span,
    Tree, TreeMeta,
};
