use serde::{Deserialize, Serialize};

/// A location in the source text.
///
/// `offset` is the authoritative byte index. `line` and `column` are 0-based
/// and derived from it for diagnostics; `column` counts bytes from the start
/// of the line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub const ZERO: Position = Position {
        line: 0,
        column: 0,
        offset: 0,
    };

    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Returns the position reached after consuming `text` from `self`.
    #[must_use]
    pub fn advance(self, text: &str) -> Position {
        let bytes = text.as_bytes();
        match bytes.iter().rposition(|&b| b == b'\n') {
            Some(last_newline) => Position {
                line: self.line + bytes.iter().filter(|&&b| b == b'\n').count(),
                column: bytes.len() - last_newline - 1,
                offset: self.offset + bytes.len(),
            },
            None => Position {
                line: self.line,
                column: self.column + bytes.len(),
                offset: self.offset + bytes.len(),
            },
        }
    }

    /// Moves the position by a byte and line delta, keeping the column.
    ///
    /// Only valid for positions on lines that the shifting edit did not touch.
    #[must_use]
    pub fn shifted(self, shift: Shift) -> Position {
        Position {
            line: self.line.saturating_add_signed(shift.lines),
            column: self.column,
            offset: self.offset.saturating_add_signed(shift.bytes),
        }
    }
}

/// Byte and line displacement applied to nodes that follow an edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shift {
    pub bytes: isize,
    pub lines: isize,
}

impl Shift {
    pub fn is_zero(self) -> bool {
        self.bytes == 0 && self.lines == 0
    }
}

/// A half-open `[start, end)` range over the source.
///
/// Every token and every node carries one, so slicing the source with
/// `start.offset..end.offset` reproduces the exact text it came from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn contains_offset(self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }

    /// True if `[start, end)` intersects this span. An empty query range
    /// overlaps when it sits strictly inside the span.
    pub fn overlaps(self, start: usize, end: usize) -> bool {
        if start == end {
            return self.start.offset < start && start < self.end.offset;
        }
        self.start.offset < end && start < self.end.offset
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    #[must_use]
    pub fn shifted(self, shift: Shift) -> Span {
        Span {
            start: self.start.shifted(shift),
            end: self.end.shifted(shift),
        }
    }
}
