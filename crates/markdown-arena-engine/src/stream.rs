//! Chunked parsing.
//!
//! [`StreamingParser`] accepts text in arbitrary pieces. Only complete lines
//! are tokenized, and of the tokens they produce the last non-blank one is
//! held back together with any blank lines after it, because more input may
//! still extend it (an unterminated fence, a paragraph that gains a setext
//! underline, another table row, indented code resuming after a gap).
//! Everything before it is committed to the tree and announced as a
//! [`StreamEvent`].

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::parsing::blocks::{BlockToken, BlockTokenKind};
use crate::parsing::{ParseOptions, Parser};
use crate::tree::{NodeId, NodeKind, Position, Span, Tree};

pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Uncommitted bytes above which [`StreamingParser::write`] asks the
    /// caller to back off.
    pub high_water_mark: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

impl StreamOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.high_water_mark == 0 {
            return Err(OptionsError::HighWaterMark);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StreamEvent {
    /// A top-level block was committed and will not change.
    Node {
        id: NodeId,
        kind: NodeKind,
        span: Span,
    },
}

pub struct StreamingParser {
    parser: Parser,
    options: StreamOptions,
    source: String,
    /// Where the next tokenize starts; everything before it is in `tree`.
    committed: Position,
    tree: Tree,
    events: VecDeque<StreamEvent>,
    backpressure: bool,
}

impl StreamingParser {
    pub fn new(parse: ParseOptions, options: StreamOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        let parser = Parser::new(parse)?;
        let tree = Tree::new(parser.language(), "");
        Ok(Self {
            parser,
            options,
            source: String::new(),
            committed: Position::ZERO,
            tree,
            events: VecDeque::new(),
            backpressure: false,
        })
    }

    /// Appends `chunk` and commits whatever it completes. Returns `false`
    /// while more than `high_water_mark` bytes are still uncommitted.
    pub fn write(&mut self, chunk: &str) -> bool {
        self.source.push_str(chunk);
        let complete = self.source.rfind('\n').map_or(0, |i| i + 1);
        if complete > self.committed.offset {
            let tokens: Vec<BlockToken<'_>> = self
                .parser
                .tokens_from(&self.source[..complete], self.committed)
                .collect();
            // The last block and the blank lines after it stay open: an
            // indented code block can still continue past them.
            let settled = tokens
                .iter()
                .rposition(|t| !matches!(t.kind, BlockTokenKind::BlankLine))
                .unwrap_or(0);
            if settled > 0 {
                let tree = std::mem::replace(&mut self.tree, Tree::new("", ""));
                let mut builder = self.parser.resume(tree);
                for token in &tokens[..settled] {
                    if let Some(id) = builder.push_block(token) {
                        let node = &builder.tree().nodes[id.0];
                        self.events.push_back(StreamEvent::Node {
                            id,
                            kind: node.kind(),
                            span: node.span,
                        });
                    }
                }
                self.tree = builder.finish();
                self.committed = tokens[settled - 1].span.end;
            }
        }

        let pending = self.source.len() - self.committed.offset;
        let over = pending > self.options.high_water_mark;
        if over != self.backpressure {
            debug!(
                "stream: {} uncommitted bytes, backpressure {}",
                pending,
                if over { "on" } else { "off" }
            );
            self.backpressure = over;
        }
        !over
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> impl Iterator<Item = StreamEvent> + '_ {
        self.events.drain(..)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Bytes that are written but not yet committed.
    pub fn pending(&self) -> usize {
        self.source.len() - self.committed.offset
    }

    /// Commits the remaining input and returns the finished tree. Events for
    /// the final blocks stay queued, and the parser is ready for a new
    /// document afterwards.
    pub fn end(&mut self) -> Tree {
        let source = std::mem::take(&mut self.source);
        let tokens: Vec<BlockToken<'_>> =
            self.parser.tokens_from(&source, self.committed).collect();
        let tree = std::mem::replace(&mut self.tree, Tree::new(self.parser.language(), ""));
        let mut builder = self.parser.resume(tree);
        for token in &tokens {
            if let Some(id) = builder.push_block(token) {
                let node = &builder.tree().nodes[id.0];
                self.events.push_back(StreamEvent::Node {
                    id,
                    kind: node.kind(),
                    span: node.span,
                });
            }
        }
        let mut tree = builder.finish();
        drop(tokens);
        tree.nodes[tree.root.0].span = Span::new(Position::ZERO, Position::ZERO.advance(&source));
        tree.meta.source = source;
        self.committed = Position::ZERO;
        self.backpressure = false;
        self.parser.finish(tree)
    }
}
