use crate::parsing::blocks::{
    line::{Line, after_optional_indent},
    token::{BlockTokenKind, Scanned},
};

/// `***`, `---` or `___`, optionally with spaces between the characters.
pub struct ThematicBreak;

impl ThematicBreak {
    pub const MARKERS: [u8; 3] = [b'-', b'*', b'_'];
    pub const MIN_COUNT: usize = 3;

    pub fn matches(text: &str) -> bool {
        let Some((_, rest)) = after_optional_indent(text) else {
            return false;
        };
        let Some(&ch) = rest.as_bytes().first() else {
            return false;
        };
        if !Self::MARKERS.contains(&ch) {
            return false;
        }
        let mut count = 0;
        for b in rest.bytes() {
            match b {
                b' ' | b'\t' => {}
                b if b == ch => count += 1,
                _ => return false,
            }
        }
        count >= Self::MIN_COUNT
    }

    pub fn scan(line: &Line<'_>) -> Option<Scanned> {
        Self::matches(line.text).then(|| Scanned {
            kind: BlockTokenKind::ThematicBreak,
            end: line.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("---", true)]
    #[case("***", true)]
    #[case("___", true)]
    #[case(" - - -", true)]
    #[case("*\t*\t*  ", true)]
    #[case("--", false)]
    #[case("-*-", false)]
    #[case("--- a", false)]
    #[case("    ---", false)]
    #[case("===", false)]
    fn thematic_breaks(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(ThematicBreak::matches(text), expected);
    }
}
