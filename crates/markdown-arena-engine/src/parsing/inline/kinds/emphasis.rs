use rustc_hash::FxHashMap;

use crate::parsing::inline::cursor::Cursor;

use super::code_span::CodeSpan;

/// Emphasis (`*a*`, `_a_`), strong (`**a**`, `__a__`) and GFM
/// strikethrough (`~~a~~`).
pub struct Emphasis;

/// How many delimiter characters a closer must supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Closer {
    Single,
    Double,
    /// Strikethrough: a run of exactly two.
    Exact2,
}

impl Emphasis {
    pub const STAR: u8 = b'*';
    pub const UNDERSCORE: u8 = b'_';
    pub const TILDE: u8 = b'~';

    pub fn is_marker(b: u8) -> bool {
        b == Self::STAR || b == Self::UNDERSCORE || b == Self::TILDE
    }

    /// An opener must be followed by non-whitespace, and `_` must not sit
    /// inside a word.
    pub fn can_open(cur: &Cursor<'_>, at: usize, ch: u8, run: usize) -> bool {
        let next_ok = cur
            .byte(at + run)
            .is_some_and(|b| !b.is_ascii_whitespace());
        let prev = at.checked_sub(1).and_then(|p| cur.s.as_bytes().get(p).copied());
        let intraword = ch == Self::UNDERSCORE && prev.is_some_and(|b| b.is_ascii_alphanumeric());
        next_ok && !intraword
    }

    /// Scans from `from` for a closing run of `ch`. Escapes and code spans
    /// are skipped. Returns the index where the closing delimiter starts;
    /// it is `want` characters long (one for `Single`, two otherwise).
    pub fn find_close(cur: &Cursor<'_>, from: usize, ch: u8, want: Closer) -> Option<usize> {
        Self::search(cur, from, ch, want, |_| {})
    }

    /// [`Emphasis::find_close`], reporting every position the walk stops at.
    fn search(
        cur: &Cursor<'_>,
        from: usize,
        ch: u8,
        want: Closer,
        mut visit: impl FnMut(usize),
    ) -> Option<usize> {
        let bytes = cur.s.as_bytes();
        let mut j = from;
        while j < cur.end {
            visit(j);
            match bytes[j] {
                b'\\' => j += 2,
                CodeSpan::TICK => j = CodeSpan::skip(cur, j),
                b if b == ch => {
                    let run = cur.run_at(j, ch);
                    let right_flanking = j > from && !bytes[j - 1].is_ascii_whitespace();
                    let after_ok = ch != Self::UNDERSCORE
                        || cur.byte(j + run).is_none_or(|b| !b.is_ascii_alphanumeric());
                    if right_flanking && after_ok {
                        match want {
                            Closer::Single if run == 1 || run >= 3 => return Some(j + run - 1),
                            Closer::Double if run >= 2 => return Some(j + run - 2),
                            Closer::Exact2 if run == 2 => return Some(j),
                            _ => {}
                        }
                    }
                    j += run;
                }
                _ => j += 1,
            }
        }
        None
    }
}

/// Closer searches of one cursor range that came up empty.
///
/// A search that failed from `from` also fails from any later position its
/// walk stopped at, since the two walks agree from there on and only the
/// starting byte is treated differently. Runs like `*a *a *a` are then
/// walked once instead of once per opener.
#[derive(Debug, Default)]
pub struct Unclosed {
    walked: FxHashMap<(u8, Closer), Vec<usize>>,
}

impl Unclosed {
    pub fn find_close(
        &mut self,
        cur: &Cursor<'_>,
        from: usize,
        ch: u8,
        want: Closer,
    ) -> Option<usize> {
        if let Some(walked) = self.walked.get(&(ch, want)) {
            if walked.binary_search(&from).is_ok() {
                return None;
            }
        }
        let mut visited = Vec::new();
        let close = Emphasis::search(cur, from, ch, want, |j| visited.push(j));
        if close.is_none() {
            self.walked.insert((ch, want), visited);
        }
        close
    }
}
