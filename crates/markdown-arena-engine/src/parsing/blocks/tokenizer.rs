use crate::tree::{Position, Span};

use super::{
    line::Line,
    open::try_open,
    token::{BlockToken, Scanned},
};

/// Single left-to-right pass over the source, one token per
/// [`Iterator::next`]. Lines are read lazily at the cursor.
#[derive(Debug, Clone)]
pub struct BlockTokenizer<'a> {
    source: &'a str,
    pos: Position,
}

impl<'a> BlockTokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::starting_at(source, Position::ZERO)
    }

    /// Resumes at `start`, which must be a line start. Tokens are identical
    /// to those a full pass produces from that point, provided a token of
    /// the full pass also started there.
    pub fn starting_at(source: &'a str, start: Position) -> Self {
        Self { source, pos: start }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

/// Turns a scan result into a token starting at `start`.
pub(crate) fn token_from<'a>(source: &'a str, start: Position, scanned: Scanned) -> BlockToken<'a> {
    BlockToken {
        kind: scanned.kind,
        span: Span::new(start, scanned.end),
        raw: &source[start.offset..scanned.end.offset],
    }
}

impl<'a> Iterator for BlockTokenizer<'a> {
    type Item = BlockToken<'a>;

    fn next(&mut self) -> Option<BlockToken<'a>> {
        let line = Line::read(self.source, self.pos)?;
        let scanned = try_open(self.source, &line);
        self.pos = scanned.end;
        Some(token_from(self.source, line.start, scanned))
    }
}

/// Convenience: tokenizes the whole of `source`.
pub fn tokenize(source: &str) -> Vec<BlockToken<'_>> {
    BlockTokenizer::new(source).collect()
}
