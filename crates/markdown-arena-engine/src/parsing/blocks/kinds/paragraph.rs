use crate::parsing::{
    blocks::{
        line::Line,
        token::{BlockTokenKind, Scanned},
    },
    text::InlineText,
};

/// Paragraph block type (marker struct).
///
/// Paragraphs have no delimiters - they are the default leaf block
/// when no other block opener matches. Inline parsing is applied
/// to paragraph content.
pub struct Paragraph;

impl Paragraph {
    /// A paragraph made of `line` alone.
    pub fn scan(line: &Line<'_>) -> Scanned {
        let at = line.content_start();
        Scanned {
            kind: BlockTokenKind::Paragraph {
                content: InlineText::single(
                    line.text[at..].trim_end_matches([' ', '\t']),
                    line.position_at(at),
                ),
            },
            end: line.end(),
        }
    }

    /// A paragraph spanning `lines`, joined with their leading whitespace
    /// removed. Returns `None` for an empty slice.
    pub fn scan_lines(lines: &[Line<'_>]) -> Option<Scanned> {
        let last = lines.last()?;
        let mut content = InlineText::default();
        for line in lines {
            let at = line.content_start();
            content.push_line(&line.text[at..], line.position_at(at));
        }
        content.trim_end();
        Some(Scanned {
            kind: BlockTokenKind::Paragraph { content },
            end: last.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;

    #[test]
    fn single_line_is_trimmed() {
        let line = Line::read("  hello  \n", Position::ZERO).unwrap();
        match Paragraph::scan(&line).kind {
            BlockTokenKind::Paragraph { content } => {
                assert_eq!(content.as_str(), "hello");
                assert_eq!(content.position_at(0), Position::new(0, 2, 2));
            }
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn lines_keep_inner_trailing_spaces() {
        let src = "a  \n b\n";
        let first = Line::read(src, Position::ZERO).unwrap();
        let second = first.next(src).unwrap();
        let scanned = Paragraph::scan_lines(&[first, second]).unwrap();
        assert_eq!(scanned.end, Position::new(2, 0, 7));
        match scanned.kind {
            BlockTokenKind::Paragraph { content } => assert_eq!(content.as_str(), "a  \nb"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }
}
