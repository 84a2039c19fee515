use crate::parsing::blocks::{
    line::{Line, strip_columns},
    token::{BlockTokenKind, Scanned},
};

/// Code indented by at least four columns.
pub struct IndentedCode;

impl IndentedCode {
    pub const INDENT: usize = 4;

    /// Consumes indented and blank lines. Trailing blank lines are left for
    /// the next token.
    pub fn scan<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        if line.is_blank() || line.indent().columns < Self::INDENT {
            return None;
        }
        let mut lines: Vec<&str> = Vec::new();
        let mut kept = 0;
        let mut end = line.end();
        let mut next = Some(*line);
        while let Some(current) = next {
            let blank = current.is_blank();
            if !blank && current.indent().columns < Self::INDENT {
                break;
            }
            lines.push(&current.text[strip_columns(current.text, Self::INDENT)..]);
            if !blank {
                kept = lines.len();
                end = current.end();
            }
            next = current.next(source);
        }
        lines.truncate(kept);
        Some(Scanned {
            kind: BlockTokenKind::Code {
                lang: None,
                meta: None,
                value: lines.join("\n"),
                fenced: false,
                closed: true,
            },
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;

    #[test]
    fn strips_four_columns_and_keeps_inner_blanks() {
        let src = "    a\n\n      b\n\n\nc";
        let line = Line::read(src, Position::ZERO).unwrap();
        let scanned = IndentedCode::scan(src, &line).unwrap();
        assert_eq!(scanned.end, Position::new(3, 0, 15));
        match scanned.kind {
            BlockTokenKind::Code { value, fenced, .. } => {
                assert_eq!(value, "a\n\n  b");
                assert!(!fenced);
            }
            other => panic!("expected code, got {other:?}"),
        }
    }

    #[test]
    fn three_spaces_is_not_code() {
        let line = Line::read("   a", Position::ZERO).unwrap();
        assert!(IndentedCode::scan("   a", &line).is_none());
    }
}
