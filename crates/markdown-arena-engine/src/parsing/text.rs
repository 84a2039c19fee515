use crate::tree::Position;

/// Inline-eligible text of a block, with enough bookkeeping to map any byte
/// of it back to a source [`Position`].
///
/// Multi-line content (blockquote runs, coalesced paragraphs) has its line
/// prefixes stripped, so `text` is not a contiguous slice of the source. Each
/// line is recorded as a segment; lines are joined with a single `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineText {
    pub text: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    /// Byte offset of the segment within `text`.
    at: usize,
    /// Source position of the segment's first byte.
    start: Position,
}

impl InlineText {
    /// Content taken from a single source slice starting at `start`.
    pub fn single(text: &str, start: Position) -> Self {
        let mut out = Self::default();
        let mut at = start;
        for line in text.split('\n') {
            out.push_line(line, at);
            at = at.advance(line).advance("\n");
        }
        out
    }

    /// Appends one more line, separated from the previous one by `\n`.
    pub fn push_line(&mut self, line: &str, start: Position) {
        if !self.segments.is_empty() {
            self.text.push('\n');
        }
        self.segments.push(Segment {
            at: self.text.len(),
            start,
        });
        self.text.push_str(line);
    }

    /// Trims trailing spaces and tabs off the last line.
    pub fn trim_end(&mut self) {
        let floor = self.segments.last().map_or(0, |s| s.at);
        let keep = self.text[floor..].trim_end_matches([' ', '\t']).len();
        self.text.truncate(floor + keep);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Source position of byte `offset` of `text`.
    ///
    /// A joining `\n` maps to the end of the line before it.
    pub fn position_at(&self, offset: usize) -> Position {
        let idx = self
            .segments
            .partition_point(|s| s.at <= offset)
            .saturating_sub(1);
        match self.segments.get(idx) {
            Some(seg) => {
                // Segments hold no newline, so only the column moves.
                let n = offset.clamp(seg.at, self.text.len()) - seg.at;
                Position::new(seg.start.line, seg.start.column + n, seg.start.offset + n)
            }
            None => Position::ZERO,
        }
    }
}
