use crate::parsing::inline::cursor::Cursor;

/// Code span inline type with owned delimiter constant.
///
/// Code spans are "raw zones" - no other inline parsing occurs inside them.
/// Other scanners skip over them when looking for closing delimiters.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick character that delimits code spans.
    pub const TICK: u8 = b'`';

    /// Finds the closing run for an opening run of `n` backticks whose
    /// content starts at `from`. Returns the index of the closing run.
    pub fn find_close(cur: &Cursor<'_>, from: usize, n: usize) -> Option<usize> {
        let bytes = cur.s.as_bytes();
        let mut j = from;
        while j < cur.end {
            if bytes[j] == Self::TICK {
                let run = cur.run_at(j, Self::TICK);
                if run == n {
                    return Some(j);
                }
                j += run;
            } else {
                j += 1;
            }
        }
        None
    }

    /// Index just past the code span opening at `at`, or `at + run` if it
    /// is never closed. Used to step over raw zones.
    pub fn skip(cur: &Cursor<'_>, at: usize) -> usize {
        let n = cur.run_at(at, Self::TICK);
        match Self::find_close(cur, at + n, n) {
            Some(close) => close + n,
            None => at + n,
        }
    }

    /// Line endings become spaces; one space is stripped from each side when
    /// both are present and the content is not all spaces.
    pub fn normalize(content: &str) -> String {
        let value = content.replace('\n', " ");
        let b = value.as_bytes();
        if b.len() >= 2 && b[0] == b' ' && b[b.len() - 1] == b' ' && b.iter().any(|&c| c != b' ') {
            value[1..value.len() - 1].to_string()
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_matching_run_length() {
        let cur = Cursor::new("``a ` b``");
        assert_eq!(CodeSpan::find_close(&cur, 2, 2), Some(7));
    }

    #[test]
    fn unclosed_run_is_skipped_whole() {
        let cur = Cursor::new("``a");
        assert_eq!(CodeSpan::skip(&cur, 0), 2);
    }

    #[test]
    fn normalize_strips_one_space_each_side() {
        assert_eq!(CodeSpan::normalize(" `a` "), "`a`");
        assert_eq!(CodeSpan::normalize("  "), "  ");
        assert_eq!(CodeSpan::normalize("a\nb"), "a b");
        assert_eq!(CodeSpan::normalize(" a"), " a");
    }
}
