use crate::parsing::{
    blocks::{
        line::{Line, after_optional_indent},
        token::{BlockTokenKind, Scanned},
    },
    text::InlineText,
};

/// Blockquote block type with owned delimiter constant.
///
/// A blockquote token is a run of consecutive `>`-prefixed lines. Its depth
/// is taken from the first line; every line contributes its text after the
/// prefixes to a single inline content.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Strips blockquote prefixes from a line, returning (depth, byte_offset).
    ///
    /// Handles various forms: `> text`, `>> nested`, `> > spaced nested`.
    ///
    /// # Returns
    /// - `depth`: Number of `>` prefixes found (0 if not a blockquote)
    /// - `byte_offset`: Index into `s` where content begins after prefixes
    pub fn strip_prefixes(s: &str) -> (u8, usize) {
        let b = s.as_bytes();
        let mut i = 0usize;
        let mut depth = 0u8;

        loop {
            while i < b.len() && b[i] == b' ' {
                i += 1;
            }
            if i < b.len() && b[i] == (Self::PREFIX as u8) {
                depth = depth.saturating_add(1);
                i += 1;
                if i < b.len() && b[i] == b' ' {
                    i += 1;
                }
            } else {
                break;
            }
        }
        (depth, i)
    }

    fn opens(text: &str) -> bool {
        after_optional_indent(text).is_some_and(|(_, rest)| rest.starts_with(Self::PREFIX))
    }

    pub fn scan<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        if !Self::opens(line.text) {
            return None;
        }
        let (depth, _) = Self::strip_prefixes(line.text);
        let mut content = InlineText::default();
        let mut current = *line;
        loop {
            let (_, at) = Self::strip_prefixes(current.text);
            content.push_line(&current.text[at..], current.position_at(at));
            match current.next(source) {
                Some(next) if Self::opens(next.text) => current = next,
                _ => break,
            }
        }
        content.trim_end();
        Some(Scanned {
            kind: BlockTokenKind::Blockquote { depth, content },
            end: current.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;

    #[test]
    fn strip_no_quote() {
        assert_eq!(BlockQuote::strip_prefixes("hello"), (0, 0));
    }

    #[test]
    fn strip_single_quote() {
        assert_eq!(BlockQuote::strip_prefixes("> hello"), (1, 2));
    }

    #[test]
    fn strip_double_quote() {
        assert_eq!(BlockQuote::strip_prefixes("> > hello"), (2, 4));
    }

    #[test]
    fn strip_nested_quote_no_space() {
        assert_eq!(BlockQuote::strip_prefixes(">> hello"), (2, 3));
    }

    #[test]
    fn scan_consumes_run_of_quoted_lines() {
        let src = "> one\n> two\nafter\n";
        let line = Line::read(src, Position::ZERO).unwrap();
        let scanned = BlockQuote::scan(src, &line).unwrap();
        assert_eq!(scanned.end, Position::new(2, 0, 12));
        match scanned.kind {
            BlockTokenKind::Blockquote { depth, content } => {
                assert_eq!(depth, 1);
                assert_eq!(content.as_str(), "one\ntwo");
            }
            other => panic!("expected blockquote, got {other:?}"),
        }
    }

    #[test]
    fn scan_reports_depth_of_first_line() {
        let src = ">> deep\n";
        let line = Line::read(src, Position::ZERO).unwrap();
        let scanned = BlockQuote::scan(src, &line).unwrap();
        assert!(matches!(
            scanned.kind,
            BlockTokenKind::Blockquote { depth: 2, .. }
        ));
    }

    #[test]
    fn plain_line_is_not_a_quote() {
        let line = Line::read("a > b", Position::ZERO).unwrap();
        assert!(BlockQuote::scan("a > b", &line).is_none());
    }
}
