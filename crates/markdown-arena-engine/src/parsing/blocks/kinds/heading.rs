use crate::parsing::{
    blocks::{
        line::{Line, after_optional_indent, is_blank},
        token::{BlockTokenKind, Scanned},
    },
    text::InlineText,
};

/// ATX (`# Title`) and setext (`Title` over `===`) headings.
pub struct Heading;

impl Heading {
    pub const ATX: u8 = b'#';
    pub const MAX_DEPTH: usize = 6;

    /// `#`×1–6 followed by a space, a tab or the end of the line.
    pub fn scan_atx(line: &Line<'_>) -> Option<Scanned> {
        let (indent, rest) = after_optional_indent(line.text)?;
        let depth = rest.bytes().take_while(|&b| b == Self::ATX).count();
        if depth == 0 || depth > Self::MAX_DEPTH {
            return None;
        }
        let after = &rest[depth..];
        if !(after.is_empty() || after.starts_with([' ', '\t'])) {
            return None;
        }

        let body = strip_closing_sequence(after);
        let lead = body.len() - body.trim_start_matches([' ', '\t']).len();
        let text = body.trim_matches([' ', '\t']);
        let at = indent + depth + lead;

        Some(Scanned {
            kind: BlockTokenKind::Heading {
                depth: depth as u8,
                setext: false,
                content: InlineText::single(text, line.position_at(at)),
            },
            end: line.end(),
        })
    }

    /// Level of a setext underline: 1 for `=`, 2 for `-`.
    pub fn underline(text: &str) -> Option<u8> {
        let (_, rest) = after_optional_indent(text)?;
        let ch = *rest.as_bytes().first()?;
        let depth = match ch {
            b'=' => 1,
            b'-' => 2,
            _ => return None,
        };
        let run = rest.bytes().take_while(|&b| b == ch).count();
        is_blank(&rest[run..]).then_some(depth)
    }

    /// A non-blank line followed by an underline.
    pub fn scan_setext<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        let next = line.next(source)?;
        let depth = Self::underline(next.text)?;
        let at = line.content_start();
        Some(Scanned {
            kind: BlockTokenKind::Heading {
                depth,
                setext: true,
                content: InlineText::single(
                    line.text[at..].trim_end_matches([' ', '\t']),
                    line.position_at(at),
                ),
            },
            end: next.end(),
        })
    }
}

/// Drops an optional closing run of `#` (preceded by whitespace) and the
/// whitespace around it.
fn strip_closing_sequence(s: &str) -> &str {
    let trimmed = s.trim_end_matches([' ', '\t']);
    let without = trimmed.trim_end_matches(Heading::ATX as char);
    if without.len() == trimmed.len() {
        return trimmed;
    }
    if without.is_empty() || without.ends_with([' ', '\t']) {
        without
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;
    use rstest::rstest;

    fn atx(src: &str) -> Option<(u8, String, Position)> {
        let line = Line::read(src, Position::ZERO)?;
        match Heading::scan_atx(&line)?.kind {
            BlockTokenKind::Heading { depth, content, .. } => {
                Some((depth, content.as_str().to_string(), content.position_at(0)))
            }
            _ => None,
        }
    }

    #[rstest]
    #[case("# Hello", 1, "Hello")]
    #[case("###### six", 6, "six")]
    #[case("## closed ##", 2, "closed")]
    #[case("# not#closed", 1, "not#closed")]
    #[case("#", 1, "")]
    #[case("#   spaced   ", 1, "spaced")]
    fn atx_headings(#[case] src: &str, #[case] depth: u8, #[case] text: &str) {
        let (d, t, _) = atx(src).unwrap();
        assert_eq!(d, depth);
        assert_eq!(t, text);
    }

    #[rstest]
    #[case("####### seven")]
    #[case("#hashtag")]
    #[case("    # indented")]
    fn not_atx(#[case] src: &str) {
        assert!(atx(src).is_none());
    }

    #[test]
    fn atx_content_position() {
        let (_, _, at) = atx("  ## Title").unwrap();
        assert_eq!(at, Position::new(0, 5, 5));
    }

    #[rstest]
    #[case("===", Some(1))]
    #[case("---  ", Some(2))]
    #[case("   =", Some(1))]
    #[case("- -", None)]
    #[case("==a", None)]
    fn underlines(#[case] text: &str, #[case] expected: Option<u8>) {
        assert_eq!(Heading::underline(text), expected);
    }

    #[test]
    fn setext_spans_both_lines() {
        let src = "Title\n---\nnext";
        let line = Line::read(src, Position::ZERO).unwrap();
        let scanned = Heading::scan_setext(src, &line).unwrap();
        assert_eq!(scanned.end, Position::new(2, 0, 10));
        assert!(matches!(
            scanned.kind,
            BlockTokenKind::Heading {
                depth: 2,
                setext: true,
                ..
            }
        ));
    }
}
