use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::parsing::blocks::kinds::definition::{decode, destination, title};
use crate::parsing::inline::cursor::Cursor;

use super::code_span::CodeSpan;

/// Inline links `[text](url "title")` and images `![alt](url)`.
pub struct Link;

/// A matched link or image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Range of the bracketed text.
    pub inner: Range<usize>,
    pub url: String,
    pub title: Option<String>,
    /// Index just past the closing `)`.
    pub end: usize,
}

impl Link {
    pub const OPEN: u8 = b'[';
    pub const CLOSE: u8 = b']';
    pub const IMAGE: &'static [u8] = b"![";

    /// Matches a link whose `[` is at `open`.
    pub fn scan(cur: &Cursor<'_>, open: usize) -> Option<LinkMatch> {
        Self::complete(cur, open, Self::find_bracket_close(cur, open)?)
    }

    /// Matches the `(destination "title")` part after the `]` at `close`.
    pub fn complete(cur: &Cursor<'_>, open: usize, close: usize) -> Option<LinkMatch> {
        if cur.byte(close + 1) != Some(b'(') {
            return None;
        }
        let after = &cur.s[close + 2..cur.end];
        let rest = after.trim_start();
        let (url, rest) = if rest.starts_with(')') {
            ("", rest)
        } else {
            destination(rest)?
        };
        let trimmed = rest.trim_start();
        let (title_text, rest) = if trimmed.len() < rest.len() || url.is_empty() {
            match title(trimmed) {
                Some((t, r)) => (Some(t), r),
                None => (None, trimmed),
            }
        } else {
            (None, rest)
        };
        let rest = rest.trim_start();
        if !rest.starts_with(')') {
            return None;
        }
        Some(LinkMatch {
            inner: open + 1..close,
            url: decode(url),
            title: title_text.map(decode),
            end: cur.end - rest.len() + 1,
        })
    }

    /// Index of the `]` balancing the `[` at `open`. Escapes and code spans
    /// are skipped.
    fn find_bracket_close(cur: &Cursor<'_>, open: usize) -> Option<usize> {
        let bytes = cur.s.as_bytes();
        let mut depth = 0usize;
        let mut j = open + 1;
        while j < cur.end {
            match bytes[j] {
                b'\\' => j += 2,
                CodeSpan::TICK => j = CodeSpan::skip(cur, j),
                Self::OPEN => {
                    depth += 1;
                    j += 1;
                }
                Self::CLOSE if depth == 0 => return Some(j),
                Self::CLOSE => {
                    depth -= 1;
                    j += 1;
                }
                _ => j += 1,
            }
        }
        None
    }
}

/// Balancing `]` for each `[` of one cursor range.
///
/// One walk from an opener records every opener it passes, so a run of
/// unclosed brackets is walked once rather than once per bracket.
#[derive(Debug, Default)]
pub struct Brackets {
    closes: FxHashMap<usize, Option<usize>>,
}

impl Brackets {
    /// Same result as a fresh balanced search from `open`.
    pub fn close_of(&mut self, cur: &Cursor<'_>, open: usize) -> Option<usize> {
        if let Some(&close) = self.closes.get(&open) {
            return close;
        }
        let bytes = cur.s.as_bytes();
        let mut open_stack = vec![open];
        let mut j = open + 1;
        while j < cur.end && !open_stack.is_empty() {
            match bytes[j] {
                b'\\' => j += 2,
                CodeSpan::TICK => j = CodeSpan::skip(cur, j),
                Link::OPEN => {
                    open_stack.push(j);
                    j += 1;
                }
                Link::CLOSE => {
                    if let Some(o) = open_stack.pop() {
                        self.closes.insert(o, Some(j));
                    }
                    j += 1;
                }
                _ => j += 1,
            }
        }
        for o in open_stack {
            self.closes.insert(o, None);
        }
        self.closes.get(&open).copied().flatten()
    }
}
