use crate::parsing::{
    blocks::{
        line::{Line, after_optional_indent},
        token::{BlockTokenKind, Scanned},
    },
    text::InlineText,
};

/// A single-line list item: bullet (`-`, `*`, `+`) or ordered (`1.`, `1)`),
/// with an optional GFM task marker.
pub struct ListItem;

/// What follows the indentation of a list item line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    pub marker: char,
    pub number: Option<u64>,
    /// Byte index into the line where the content (after one space) begins.
    pub content_at: usize,
}

impl ListItem {
    pub const BULLETS: [u8; 3] = [b'-', b'*', b'+'];
    pub const ORDERED_DELIMITERS: [u8; 2] = [b'.', b')'];
    pub const MAX_DIGITS: usize = 9;

    pub fn marker(text: &str) -> Option<ListMarker> {
        let (indent, rest) = after_optional_indent(text)?;
        let bytes = rest.as_bytes();
        let (ordered, marker, number, width) = match bytes.first()? {
            b if Self::BULLETS.contains(b) => (false, *b as char, None, 1),
            b if b.is_ascii_digit() => {
                let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > Self::MAX_DIGITS {
                    return None;
                }
                let delim = *bytes.get(digits)?;
                if !Self::ORDERED_DELIMITERS.contains(&delim) {
                    return None;
                }
                let number = rest[..digits].parse::<u64>().ok()?;
                (true, delim as char, Some(number), digits + 1)
            }
            _ => return None,
        };
        // The space after the marker is mandatory.
        if !matches!(bytes.get(width), Some(b' ' | b'\t')) {
            return None;
        }
        Some(ListMarker {
            ordered,
            marker,
            number,
            content_at: indent + width + 1,
        })
    }

    /// `[ ]`, `[x]` or `[X]` followed by whitespace or the end of the line.
    /// Returns the checked state and the bytes consumed.
    pub fn task(content: &str) -> Option<(bool, usize)> {
        let checked = match content.as_bytes().get(..3)? {
            b"[ ]" => false,
            b"[x]" | b"[X]" => true,
            _ => return None,
        };
        match content.as_bytes().get(3) {
            None => Some((checked, 3)),
            Some(b' ' | b'\t') => Some((checked, 4)),
            Some(_) => None,
        }
    }

    pub fn scan(line: &Line<'_>) -> Option<Scanned> {
        let m = Self::marker(line.text)?;
        let mut at = m.content_at;
        at += line.text[at..].len() - line.text[at..].trim_start_matches([' ', '\t']).len();
        let checked = match Self::task(&line.text[at..]) {
            Some((checked, used)) => {
                at += used;
                at += line.text[at..].len() - line.text[at..].trim_start_matches([' ', '\t']).len();
                Some(checked)
            }
            None => None,
        };
        let text = line.text[at..].trim_end_matches([' ', '\t']);
        Some(Scanned {
            kind: BlockTokenKind::ListItem {
                ordered: m.ordered,
                marker: m.marker,
                number: m.number,
                checked,
                content: InlineText::single(text, line.position_at(at)),
            },
            end: line.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;
    use rstest::rstest;

    fn scan(src: &str) -> Option<BlockTokenKind> {
        let line = Line::read(src, Position::ZERO)?;
        ListItem::scan(&line).map(|s| s.kind)
    }

    #[rstest]
    #[case("- item", false, '-', None)]
    #[case("* item", false, '*', None)]
    #[case("+ item", false, '+', None)]
    #[case("1. item", true, '.', Some(1))]
    #[case("42) item", true, ')', Some(42))]
    fn markers(
        #[case] src: &str,
        #[case] ordered: bool,
        #[case] marker: char,
        #[case] number: Option<u64>,
    ) {
        let m = ListItem::marker(src).unwrap();
        assert_eq!((m.ordered, m.marker, m.number), (ordered, marker, number));
    }

    #[rstest]
    #[case("-item")]
    #[case("1.item")]
    #[case("1234567890. too long")]
    #[case("a. letter")]
    #[case("-")]
    fn not_list_items(#[case] src: &str) {
        assert!(ListItem::marker(src).is_none());
    }

    #[test]
    fn task_markers() {
        match scan("- [x] Done").unwrap() {
            BlockTokenKind::ListItem {
                checked, content, ..
            } => {
                assert_eq!(checked, Some(true));
                assert_eq!(content.as_str(), "Done");
                assert_eq!(content.position_at(0), Position::new(0, 6, 6));
            }
            other => panic!("expected list item, got {other:?}"),
        }
        match scan("- [ ] Todo").unwrap() {
            BlockTokenKind::ListItem { checked, .. } => assert_eq!(checked, Some(false)),
            other => panic!("expected list item, got {other:?}"),
        }
    }

    #[test]
    fn bracket_text_is_not_a_task() {
        match scan("- [link] text").unwrap() {
            BlockTokenKind::ListItem {
                checked, content, ..
            } => {
                assert_eq!(checked, None);
                assert_eq!(content.as_str(), "[link] text");
            }
            other => panic!("expected list item, got {other:?}"),
        }
    }
}
