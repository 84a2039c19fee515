use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::inline::cursor::Cursor;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*$").unwrap());

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*$").unwrap()
});

static BARE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.+\-_]+@[A-Za-z0-9\-_]+(?:\.[A-Za-z0-9\-_]+)+").unwrap()
});

/// `<scheme:...>`, `<user@host>` and the GFM extended forms: bare
/// `http://`, `https://`, `www.` and email addresses.
pub struct Autolink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutolinkMatch {
    pub url: String,
    /// Range of the visible text.
    pub text: Range<usize>,
    /// Index just past the match.
    pub end: usize,
}

impl Autolink {
    pub const OPEN: u8 = b'<';
    pub const CLOSE: u8 = b'>';
    const BARE_PREFIXES: [&'static str; 3] = ["https://", "http://", "www."];
    const TRAILING_PUNCT: &'static [u8] = b"?!.,:*_~'\"";

    /// Matches `<...>` with `<` at `at`.
    pub fn angle(cur: &Cursor<'_>, at: usize) -> Option<AutolinkMatch> {
        let body = &cur.s[at + 1..cur.end];
        let close = body.find([Self::CLOSE as char, '<', '\n', ' '])?;
        if body.as_bytes()[close] != Self::CLOSE {
            return None;
        }
        let inner = &body[..close];
        let url = if SCHEME.is_match(inner) {
            inner.to_string()
        } else if EMAIL.is_match(inner) {
            format!("mailto:{inner}")
        } else {
            return None;
        };
        Some(AutolinkMatch {
            url,
            text: at + 1..at + 1 + close,
            end: at + close + 2,
        })
    }

    /// Bare links may only start a word.
    pub fn at_word_start(cur: &Cursor<'_>, at: usize) -> bool {
        let prev = at.checked_sub(1).map(|p| cur.s.as_bytes()[p]);
        match prev {
            None => true,
            Some(b) => b.is_ascii_whitespace() || matches!(b, b'*' | b'_' | b'~' | b'('),
        }
    }

    /// Cheap test used by the text scanner to decide where to stop.
    pub fn is_candidate(cur: &Cursor<'_>, at: usize) -> bool {
        let rest = &cur.s[at..cur.end];
        if Self::BARE_PREFIXES.iter().any(|p| rest.starts_with(p)) {
            return true;
        }
        let word_end = rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len());
        rest[..word_end].contains('@')
    }

    /// Matches a bare URL or email at `at`.
    pub fn bare(cur: &Cursor<'_>, at: usize) -> Option<AutolinkMatch> {
        if !Self::at_word_start(cur, at) {
            return None;
        }
        let rest = &cur.s[at..cur.end];
        if let Some(prefix) = Self::BARE_PREFIXES.iter().find(|p| rest.starts_with(*p)) {
            let run = rest.find(|c: char| c.is_whitespace() || c == '<').unwrap_or(rest.len());
            let len = Self::trim_trailing(&rest[..run]);
            // Trailing punctuation may eat into the prefix itself (`www.`).
            let host = rest.get(prefix.len()..len)?;
            if !host.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                return None;
            }
            let text = &rest[..len];
            let url = if *prefix == "www." {
                format!("http://{text}")
            } else {
                text.to_string()
            };
            return Some(AutolinkMatch {
                url,
                text: at..at + len,
                end: at + len,
            });
        }
        let m = BARE_EMAIL.find(rest)?;
        let mut len = m.end();
        // A trailing `.` is punctuation, not part of the domain.
        while rest.as_bytes()[len - 1] == b'.' {
            len -= 1;
        }
        if matches!(rest.as_bytes()[len - 1], b'-' | b'_') {
            return None;
        }
        let text = &rest[..len];
        Some(AutolinkMatch {
            url: format!("mailto:{text}"),
            text: at..at + len,
            end: at + len,
        })
    }

    /// Length of `s` once trailing punctuation and unbalanced `)` are dropped.
    fn trim_trailing(s: &str) -> usize {
        let bytes = s.as_bytes();
        let mut len = bytes.len();
        loop {
            match bytes[..len].last() {
                Some(b) if Self::TRAILING_PUNCT.contains(b) => len -= 1,
                Some(b')') => {
                    let open = bytes[..len].iter().filter(|&&b| b == b'(').count();
                    let close = bytes[..len].iter().filter(|&&b| b == b')').count();
                    if close > open {
                        len -= 1;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        len
    }
}
