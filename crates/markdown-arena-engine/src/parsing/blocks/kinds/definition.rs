use crate::parsing::blocks::{
    line::{Line, after_optional_indent},
    token::{BlockTokenKind, Scanned},
};

/// Single-line link reference definition: `[label]: url "title"`.
pub struct Definition;

impl Definition {
    pub const MAX_LABEL: usize = 999;

    pub fn scan(line: &Line<'_>) -> Option<Scanned> {
        let (label, url, title) = Self::parse(line.text)?;
        Some(Scanned {
            kind: BlockTokenKind::Definition { label, url, title },
            end: line.end(),
        })
    }

    /// Parses a whole line. Anything malformed yields `None` so the line
    /// falls through to a paragraph.
    pub fn parse(text: &str) -> Option<(String, String, Option<String>)> {
        let (_, rest) = after_optional_indent(text)?;
        let rest = rest.strip_prefix('[')?;

        let bytes = rest.as_bytes();
        let mut i = 0;
        let close = loop {
            match bytes.get(i)? {
                b'\\' => i += 2,
                b'[' => return None,
                b']' => break i,
                _ => i += 1,
            }
        };
        let raw_label = &rest[..close];
        if raw_label.trim().is_empty() || raw_label.len() > Self::MAX_LABEL {
            return None;
        }
        let rest = rest[close + 1..].strip_prefix(':')?;
        let rest = rest.trim_start_matches([' ', '\t']);

        let (url, rest) = destination(rest)?;
        let after_url = rest.trim_start_matches([' ', '\t']);
        let (title, rest) = if after_url.len() < rest.len() || after_url.is_empty() {
            match title(after_url) {
                Some((title, rest)) => (Some(title), rest),
                None => (None, after_url),
            }
        } else {
            (None, rest)
        };
        if !rest.trim_matches([' ', '\t']).is_empty() {
            return None;
        }

        Some((
            normalize_label(raw_label),
            decode(url),
            title.map(decode),
        ))
    }
}

/// Trims, collapses inner whitespace and case-folds a label.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves backslash escapes and HTML entities.
pub fn decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next.is_ascii_punctuation() => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    html_escape::decode_html_entities(&out).into_owned()
}

/// `<...>` or a run of non-whitespace with balanced parentheses.
/// Returns the destination and the text after it.
pub fn destination(s: &str) -> Option<(&str, &str)> {
    if let Some(inner) = s.strip_prefix('<') {
        let end = inner.find(['>', '\n', '<'])?;
        if inner.as_bytes()[end] != b'>' {
            return None;
        }
        return Some((&inner[..end], &inner[end + 1..]));
    }
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 1,
            b'(' => depth += 1,
            b')' if depth == 0 => break,
            b')' => depth -= 1,
            b if b.is_ascii_whitespace() || b.is_ascii_control() => break,
            _ => {}
        }
        i += 1;
    }
    if i == 0 || depth != 0 {
        return None;
    }
    Some((&s[..i], &s[i..]))
}

/// `"title"`, `'title'` or `(title)`. Returns the inner text and the rest.
pub fn title(s: &str) -> Option<(&str, &str)> {
    let open = *s.as_bytes().first()?;
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == close => return Some((&s[1..i], &s[i + 1..])),
            b'(' if open == b'(' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}
