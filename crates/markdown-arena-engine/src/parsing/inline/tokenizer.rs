use std::ops::Range;

use crate::parsing::text::InlineText;
use crate::tree::Span;

use super::MAX_INLINE_DEPTH;
use super::cursor::Cursor;
use super::kinds::{
    Autolink, Brackets, Closer, CodeSpan, Emphasis, Escape, Escaped, Link, LinkMatch, Unclosed,
};
use super::token::{InlineToken, InlineTokenKind};

/// Bytes that may start something other than plain text.
const SIGNIFICANT: &[u8] = b"`*_~[\\\n<";

/// Left-to-right inline tokenizer over one range of a block's text.
///
/// Yields tokens in order; their ranges tile the scanned range with no gaps.
/// Container tokens are not descended into; callers tokenize `inner`
/// ranges themselves.
pub struct InlineTokenizer<'t> {
    text: &'t InlineText,
    cur: Cursor<'t>,
    brackets: Brackets,
    unclosed: Unclosed,
}

impl<'t> InlineTokenizer<'t> {
    pub fn new(text: &'t InlineText) -> Self {
        Self::over(text, 0..text.len())
    }

    pub fn over(text: &'t InlineText, range: Range<usize>) -> Self {
        Self {
            text,
            cur: Cursor::over(text.as_str(), range),
            brackets: Brackets::default(),
            unclosed: Unclosed::default(),
        }
    }

    fn token(&self, kind: InlineTokenKind, range: Range<usize>) -> InlineToken<'t> {
        let span = Span::new(
            self.text.position_at(range.start),
            self.text.position_at(range.end),
        );
        InlineToken {
            kind,
            raw: &self.text.as_str()[range.clone()],
            range,
            span,
        }
    }

    fn text_kind(&self, range: Range<usize>) -> (InlineTokenKind, usize) {
        let end = range.end;
        let value = self.cur.s[range].to_string();
        (InlineTokenKind::Text { value }, end)
    }

    /// Scans one token starting at `at`; returns its kind and end index.
    fn scan_at(&mut self, at: usize) -> (InlineTokenKind, usize) {
        let cur = &self.cur.clone();
        let Some(b) = cur.byte(at) else {
            return self.text_kind(at..at);
        };
        match b {
            CodeSpan::TICK => {
                let n = cur.run_at(at, CodeSpan::TICK);
                match CodeSpan::find_close(cur, at + n, n) {
                    Some(close) => {
                        let value = CodeSpan::normalize(&cur.s[at + n..close]);
                        (InlineTokenKind::CodeSpan { value }, close + n)
                    }
                    None => self.text_kind(at..at + n),
                }
            }
            Emphasis::STAR | Emphasis::UNDERSCORE => self.emphasis(at, b),
            Emphasis::TILDE => {
                let run = cur.run_at(at, b);
                if run == 2 && Emphasis::can_open(cur, at, b, run) {
                    if let Some(close) = self.unclosed.find_close(cur, at + 2, b, Closer::Exact2) {
                        return (
                            InlineTokenKind::Strikethrough {
                                inner: at + 2..close,
                            },
                            close + 2,
                        );
                    }
                }
                self.text_kind(at..at + run)
            }
            Link::OPEN => match self.link(cur, at) {
                Some(m) => (
                    InlineTokenKind::Link {
                        inner: m.inner,
                        url: m.url,
                        title: m.title,
                    },
                    m.end,
                ),
                None => self.text_kind(at..at + 1),
            },
            b'!' if cur.byte(at + 1) == Some(Link::OPEN) => match self.link(cur, at + 1) {
                Some(m) => (
                    InlineTokenKind::Image {
                        inner: m.inner,
                        url: m.url,
                        title: m.title,
                    },
                    m.end,
                ),
                None => self.text_kind(at..at + 1),
            },
            Escape::BACKSLASH => match Escape::classify(cur, at) {
                Escaped::Literal(c) => (
                    InlineTokenKind::Text {
                        value: c.to_string(),
                    },
                    at + 2,
                ),
                Escaped::HardBreak => (InlineTokenKind::HardBreak, self.skip_indent(at + 2)),
                Escaped::Backslash => self.text_kind(at..at + 1),
            },
            b'\n' => (InlineTokenKind::SoftBreak, self.skip_indent(at + 1)),
            b' ' => match self.spaces_before_newline(at) {
                Some(n) if n >= 2 => (InlineTokenKind::HardBreak, self.skip_indent(at + n + 1)),
                Some(n) => (InlineTokenKind::SoftBreak, self.skip_indent(at + n + 1)),
                None => self.text_run(at),
            },
            Autolink::OPEN => match Autolink::angle(cur, at) {
                Some(m) => (
                    InlineTokenKind::Autolink {
                        url: m.url,
                        text: m.text,
                    },
                    m.end,
                ),
                None => self.text_kind(at..at + 1),
            },
            b if b.is_ascii_alphanumeric() && Autolink::is_candidate(cur, at) => {
                match Autolink::bare(cur, at) {
                    Some(m) => (
                        InlineTokenKind::Autolink {
                            url: m.url,
                            text: m.text,
                        },
                        m.end,
                    ),
                    None => self.text_run(at),
                }
            }
            _ => self.text_run(at),
        }
    }

    fn link(&mut self, cur: &Cursor<'t>, open: usize) -> Option<LinkMatch> {
        let close = self.brackets.close_of(cur, open)?;
        Link::complete(cur, open, close)
    }

    fn emphasis(&mut self, at: usize, ch: u8) -> (InlineTokenKind, usize) {
        let cur = &self.cur.clone();
        let run = cur.run_at(at, ch);
        if Emphasis::can_open(cur, at, ch, run) {
            if run == 1 {
                if let Some(close) = self.unclosed.find_close(cur, at + 1, ch, Closer::Single) {
                    return (InlineTokenKind::Emphasis { inner: at + 1..close }, close + 1);
                }
            } else if let Some(close) = self.unclosed.find_close(cur, at + 2, ch, Closer::Double) {
                return (InlineTokenKind::Strong { inner: at + 2..close }, close + 2);
            }
        }
        self.text_kind(at..at + run)
    }

    /// Plain text up to the next byte that might start another token.
    fn text_run(&self, at: usize) -> (InlineTokenKind, usize) {
        let cur = &self.cur;
        let bytes = cur.s.as_bytes();
        let mut j = at + 1;
        while j < cur.end {
            let b = bytes[j];
            let stop = SIGNIFICANT.contains(&b)
                || (b == b'!' && cur.byte(j + 1) == Some(Link::OPEN))
                || (b == b' ' && self.spaces_before_newline(j).is_some())
                || (b.is_ascii_alphanumeric()
                    && Autolink::at_word_start(cur, j)
                    && Autolink::is_candidate(cur, j));
            if stop {
                break;
            }
            j += 1;
        }
        self.text_kind(at..j)
    }

    /// Number of spaces at `at` when they run into a line ending.
    fn spaces_before_newline(&self, at: usize) -> Option<usize> {
        let n = self.cur.run_at(at, b' ');
        (self.cur.byte(at + n) == Some(b'\n')).then_some(n)
    }

    /// Skips the leading spaces and tabs of a continuation line.
    fn skip_indent(&self, mut at: usize) -> usize {
        while matches!(self.cur.byte(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        at
    }
}

impl<'t> Iterator for InlineTokenizer<'t> {
    type Item = InlineToken<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur.eof() {
            return None;
        }
        let start = self.cur.pos();
        let (kind, end) = self.scan_at(start);
        // Every scanner consumes at least one byte.
        let end = end.max(start + 1).min(self.cur.end);
        self.cur.i = end;
        Some(self.token(kind, start..end))
    }
}

/// Tokenizes the whole of `text`, merging adjacent text tokens.
pub fn tokenize(text: &InlineText) -> Vec<InlineToken<'_>> {
    tokenize_range(text, 0..text.len())
}

/// Tokenizes `range` of `text`, merging adjacent text tokens.
pub fn tokenize_range(text: &InlineText, range: Range<usize>) -> Vec<InlineToken<'_>> {
    let mut out: Vec<InlineToken<'_>> = Vec::new();
    for token in InlineTokenizer::over(text, range) {
        if let (InlineTokenKind::Text { value }, Some(last)) = (&token.kind, out.last_mut()) {
            if let InlineTokenKind::Text { value: prev } = &mut last.kind {
                prev.push_str(value);
                last.range.end = token.range.end;
                last.span.end = token.span.end;
                last.raw = &text.as_str()[last.range.clone()];
                continue;
            }
        }
        out.push(token);
    }
    out
}

/// Flattens `range` to its plain text, as used for image alt text.
pub fn plain_text(text: &InlineText, range: Range<usize>) -> String {
    let mut out = String::new();
    collect_plain(text, range, 0, &mut out);
    out
}

fn collect_plain(text: &InlineText, range: Range<usize>, depth: usize, out: &mut String) {
    for token in tokenize_range(text, range) {
        match &token.kind {
            InlineTokenKind::Text { value } | InlineTokenKind::CodeSpan { value } => {
                out.push_str(value)
            }
            InlineTokenKind::Autolink { text: visible, .. } => {
                out.push_str(&text.as_str()[visible.clone()])
            }
            InlineTokenKind::HardBreak | InlineTokenKind::SoftBreak => out.push(' '),
            kind => {
                if let Some(inner) = kind.inner() {
                    if depth < MAX_INLINE_DEPTH {
                        collect_plain(text, inner, depth + 1, out);
                    } else {
                        out.push_str(&text.as_str()[inner]);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;
    use pretty_assertions::assert_eq;

    fn single(s: &str) -> InlineText {
        InlineText::single(s, Position::ZERO)
    }

    fn names(s: &str) -> Vec<&'static str> {
        let text = single(s);
        tokenize(&text).iter().map(|t| t.kind.name()).collect()
    }

    #[test]
    fn plain_text_is_one_token() {
        let text = single("just some words");
        let tokens = tokenize(&text);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].range, 0..15);
        assert_eq!(tokens[0].span.end.offset, 15);
    }

    #[test]
    fn mixed_constructs() {
        assert_eq!(
            names("a *b* **c** `d` [e](f) ![g](h) ~~i~~"),
            vec![
                "text", "emphasis", "text", "strong", "text", "codeSpan", "text", "link",
                "text", "image", "text", "strikethrough",
            ]
        );
    }

    #[test]
    fn ranges_tile_the_input() {
        let text = single("x *y* `z` [l](u) \\* <http://a.b> w");
        let tokens = tokenize(&text);
        let mut at = 0;
        for t in &tokens {
            assert_eq!(t.range.start, at);
            at = t.range.end;
        }
        assert_eq!(at, text.len());
    }

    #[test]
    fn code_span_suppresses_emphasis() {
        let text = single("`*a*`");
        let tokens = tokenize(&text);
        assert_eq!(
            tokens[0].kind,
            InlineTokenKind::CodeSpan {
                value: "*a*".to_string()
            }
        );
    }

    #[test]
    fn escapes_merge_into_text() {
        let text = single(r"a \*b\* c");
        let tokens = tokenize(&text);
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            InlineTokenKind::Text {
                value: "a *b* c".to_string()
            }
        );
        assert_eq!(tokens[0].raw, r"a \*b\* c");
    }

    #[test]
    fn unmatched_markers_are_text() {
        assert_eq!(names("a * b ** c [d _e"), vec!["text"]);
        assert_eq!(names("snake_case_name"), vec!["text"]);
    }

    #[test]
    fn breaks() {
        let mut text = InlineText::single("a  ", Position::ZERO);
        text.push_line("b", Position::new(1, 0, 4));
        text.push_line("c", Position::new(2, 0, 6));
        let tokens = tokenize(&text);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.name()).collect();
        assert_eq!(kinds, vec!["text", "hardBreak", "text", "softBreak", "text"]);
        assert_eq!(tokens[2].span.start, Position::new(1, 0, 4));
        assert_eq!(tokens[4].span.start, Position::new(2, 0, 6));
    }

    #[test]
    fn backslash_hard_break() {
        let mut text = InlineText::single("a\\", Position::ZERO);
        text.push_line("b", Position::new(1, 0, 3));
        assert_eq!(names_of(&text), vec!["text", "hardBreak", "text"]);
    }

    fn names_of(text: &InlineText) -> Vec<&'static str> {
        tokenize(text).iter().map(|t| t.kind.name()).collect()
    }

    #[test]
    fn bare_autolinks() {
        let text = single("see https://x.io/a, or www.y.org and me@z.net.");
        let urls: Vec<_> = tokenize(&text)
            .into_iter()
            .filter_map(|t| match t.kind {
                InlineTokenKind::Autolink { url, .. } => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(
            urls,
            vec!["https://x.io/a", "http://www.y.org", "mailto:me@z.net"]
        );
    }

    #[test]
    fn image_failure_keeps_bang() {
        assert_eq!(names("![not an image"), vec!["text"]);
    }

    #[test]
    fn alt_text_is_flattened() {
        let text = single("a *b* `c`");
        assert_eq!(plain_text(&text, 0..text.len()), "a b c");
    }

    #[test]
    fn multibyte_text() {
        let text = single("héllo *wörld*");
        let tokens = tokenize(&text);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].raw, "*wörld*");
    }

    #[test]
    fn long_unclosed_runs_stay_text() {
        for source in ["[".repeat(20_000), "*a ".repeat(10_000), "~~a ".repeat(10_000)] {
            let text = single(&source);
            let tokens = tokenize(&text);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].raw, source);
        }
    }

    #[test]
    fn brackets_after_an_unclosed_run_still_link() {
        assert_eq!(names("[[[ [a](b) *c **d*"), vec!["text", "link", "text", "emphasis"]);
    }
}
