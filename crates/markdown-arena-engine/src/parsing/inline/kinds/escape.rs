use crate::parsing::inline::cursor::Cursor;

/// Backslash escapes.
pub struct Escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaped {
    /// An escaped ASCII punctuation character.
    Literal(char),
    /// Backslash at the end of a line.
    HardBreak,
    /// A backslash before anything else is itself literal.
    Backslash,
}

impl Escape {
    pub const BACKSLASH: u8 = b'\\';

    /// Classifies the backslash at `at`. Literal escapes span two bytes.
    pub fn classify(cur: &Cursor<'_>, at: usize) -> Escaped {
        match cur.byte(at + 1) {
            Some(b'\n') => Escaped::HardBreak,
            Some(b) if b.is_ascii_punctuation() => Escaped::Literal(b as char),
            _ => Escaped::Backslash,
        }
    }
}
