//! Batch tokenizer.
//!
//! Precomputes cheap per-line facts a batch of lines at a time, so runs of
//! ordinary prose can be recognised without the full dispatch. Consecutive
//! plain lines are coalesced into one multi-line paragraph; every other line
//! goes through the same dispatch as [`BlockTokenizer`](super::BlockTokenizer).

use std::collections::VecDeque;

use crate::tree::Position;

use super::{
    kinds::{Heading, Paragraph, Table},
    line::{Line, indent_of},
    open::try_open,
    token::{BlockToken, BlockTokenKind, Scanned},
    tokenizer::token_from,
};

pub const DEFAULT_BATCH_SIZE: usize = 16;
pub const MAX_BATCH_SIZE: usize = 128;

/// First bytes that may open something other than a paragraph.
const SIGNIFICANT: &[u8] = b"#>-*+_=`~<[|0123456789";

/// Per-line metadata computed ahead of dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMeta<'a> {
    pub line: Line<'a>,
    /// Indentation in columns.
    pub indent: usize,
    /// First byte after the indentation, if any.
    pub first: Option<u8>,
    pub blank: bool,
}

impl<'a> LineMeta<'a> {
    fn of(line: Line<'a>) -> Self {
        let indent = indent_of(line.text);
        let first = line.text.as_bytes().get(indent.bytes).copied();
        Self {
            line,
            indent: indent.columns,
            first,
            blank: first.is_none(),
        }
    }

    /// A line that can only be paragraph text.
    pub fn is_plain(&self) -> bool {
        !self.blank
            && self.indent < 4
            && self.first.is_some_and(|b| !SIGNIFICANT.contains(&b))
            && !Table::has_pipe(self.line.text)
    }
}

#[derive(Debug, Clone)]
pub struct BatchTokenizer<'a> {
    source: &'a str,
    pos: Position,
    batch_size: usize,
    /// Lines read ahead of `pos`, in order.
    metas: VecDeque<LineMeta<'a>>,
    /// Start of the first line not yet read into `metas`.
    read_to: Position,
}

impl<'a> BatchTokenizer<'a> {
    pub fn new(source: &'a str, batch_size: usize) -> Self {
        Self::starting_at(source, Position::ZERO, batch_size)
    }

    pub fn starting_at(source: &'a str, start: Position, batch_size: usize) -> Self {
        let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        Self {
            source,
            pos: start,
            batch_size,
            metas: VecDeque::with_capacity(batch_size),
            read_to: start,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Reads up to one batch of line metadata. Returns false at end of input.
    fn fill(&mut self) -> bool {
        let mut read = 0;
        while read < self.batch_size {
            let Some(line) = Line::read(self.source, self.read_to) else {
                break;
            };
            self.read_to = line.end();
            self.metas.push_back(LineMeta::of(line));
            read += 1;
        }
        read > 0
    }

    fn meta(&mut self, i: usize) -> Option<LineMeta<'a>> {
        while self.metas.len() <= i {
            if !self.fill() {
                return None;
            }
        }
        self.metas.get(i).copied()
    }

    /// Drops read-ahead lines that the token ending at `end` consumed.
    fn consume_to(&mut self, end: Position) {
        while self
            .metas
            .front()
            .is_some_and(|m| m.line.start.offset < end.offset)
        {
            self.metas.pop_front();
        }
        if self.read_to.offset < end.offset {
            self.metas.clear();
            self.read_to = end;
        }
        self.pos = end;
    }

    /// Coalesces the run of plain lines starting at the front, and turns it
    /// into a setext heading if an underline follows.
    fn plain_run(&mut self) -> Option<Scanned> {
        let mut lines = Vec::new();
        while let Some(meta) = self.meta(lines.len()) {
            if !meta.is_plain() {
                break;
            }
            lines.push(meta.line);
        }
        let underline = self
            .meta(lines.len())
            .and_then(|next| Heading::underline(next.line.text).map(|depth| (next, depth)));
        if let Some((next, depth)) = underline {
            let scanned = Paragraph::scan_lines(&lines)?;
            let BlockTokenKind::Paragraph { content } = scanned.kind else {
                return None;
            };
            return Some(Scanned {
                kind: BlockTokenKind::Heading {
                    depth,
                    setext: true,
                    content,
                },
                end: next.line.end(),
            });
        }
        Paragraph::scan_lines(&lines)
    }
}

impl<'a> Iterator for BatchTokenizer<'a> {
    type Item = BlockToken<'a>;

    fn next(&mut self) -> Option<BlockToken<'a>> {
        let front = self.meta(0)?;
        let plain = if front.is_plain() {
            self.plain_run()
        } else {
            None
        };
        let scanned = match plain {
            Some(scanned) => scanned,
            None => try_open(self.source, &front.line),
        };
        self.consume_to(scanned.end);
        Some(token_from(self.source, front.line.start, scanned))
    }
}
