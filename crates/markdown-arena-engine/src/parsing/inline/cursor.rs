use std::ops::Range;

/// A cursor for byte-by-byte inline scanning.
///
/// Operates over a sub-range of a block's inline text. Indices are always
/// relative to the whole text, so nested ranges keep their offsets and the
/// byte before the range is still visible for flanking checks.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The whole inline text of the block.
    pub s: &'a str,
    /// Current index into `s`.
    pub i: usize,
    /// Exclusive end of the range being scanned.
    pub end: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over all of `s`.
    pub fn new(s: &'a str) -> Self {
        Self::over(s, 0..s.len())
    }

    /// Creates a cursor over `range` of `s`.
    pub fn over(s: &'a str, range: Range<usize>) -> Self {
        let end = range.end.min(s.len());
        Self {
            s,
            i: range.start.min(end),
            end,
        }
    }

    /// Returns the current index.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at the end of the range.
    pub fn eof(&self) -> bool {
        self.i >= self.end
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.byte(self.i)
    }

    /// The byte at `at`, if it lies inside the range.
    pub fn byte(&self, at: usize) -> Option<u8> {
        if at < self.end {
            self.s.as_bytes().get(at).copied()
        } else {
            None
        }
    }

    /// The byte just before the cursor, even if it precedes the range.
    pub fn prev(&self) -> Option<u8> {
        self.i
            .checked_sub(1)
            .and_then(|p| self.s.as_bytes().get(p).copied())
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.end)..self.end].starts_with(pat)
    }

    /// Length of the run of `b` starting at `at`.
    pub fn run_at(&self, at: usize, b: u8) -> usize {
        let bytes = &self.s.as_bytes()[at.min(self.end)..self.end];
        bytes.iter().take_while(|&&x| x == b).count()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Remaining text up to the end of the range.
    pub fn rest(&self) -> &'a str {
        &self.s[self.i.min(self.end)..self.end]
    }
}
