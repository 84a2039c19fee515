use std::ops::Range;

use xi_rope::Rope;

use crate::tree::Position;

/// Extracts the text for a byte range from the rope as an owned String.
///
/// This allocates; prefer working with spans where possible.
pub fn slice_to_string(rope: &Rope, range: Range<usize>) -> String {
    rope.slice_to_cow(range).into_owned()
}

/// Extracts text for a range, truncating to `max` bytes with "..." suffix if needed.
///
/// Used for human-readable snapshot output.
pub fn preview(rope: &Rope, range: Range<usize>, max: usize) -> String {
    let mut s = slice_to_string(rope, range);
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}

/// Line/column of byte `offset`, found through the rope's line index
/// rather than by scanning from the start.
pub fn position_at(rope: &Rope, offset: usize) -> Position {
    let offset = offset.min(rope.len());
    let line = rope.line_of_offset(offset);
    let line_start = rope.offset_of_line(line);
    Position::new(line, offset - line_start, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        let rope = Rope::from("hello");
        assert_eq!(preview(&rope, 0..5, 10), "hello");
    }

    #[test]
    fn preview_exact_length_unchanged() {
        let rope = Rope::from("hello");
        assert_eq!(preview(&rope, 0..5, 5), "hello");
    }

    #[test]
    fn preview_truncates_long_text() {
        let rope = Rope::from("hello world");
        assert_eq!(preview(&rope, 0..11, 5), "hello...");
    }

    #[test]
    fn preview_truncates_to_zero() {
        let rope = Rope::from("hello");
        assert_eq!(preview(&rope, 0..5, 0), "...");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let rope = Rope::from("héllo");
        assert_eq!(preview(&rope, 0..6, 2), "h...");
    }

    #[test]
    fn slice_to_string_partial_range() {
        let rope = Rope::from("hello world");
        assert_eq!(slice_to_string(&rope, 6..11), "world");
    }

    #[test]
    fn positions_from_line_index() {
        let rope = Rope::from("ab\ncd\n\nx");
        assert_eq!(position_at(&rope, 0), Position::new(0, 0, 0));
        assert_eq!(position_at(&rope, 4), Position::new(1, 1, 4));
        assert_eq!(position_at(&rope, 6), Position::new(2, 0, 6));
        assert_eq!(position_at(&rope, 8), Position::new(3, 1, 8));
        assert_eq!(position_at(&rope, 99), Position::new(3, 1, 8));
    }

    #[test]
    fn position_matches_advance() {
        let text = "# t\n\n> q\n> r\n\n```\ncode\n```\n";
        let rope = Rope::from(text);
        for offset in 0..=text.len() {
            assert_eq!(
                position_at(&rope, offset),
                Position::ZERO.advance(&text[..offset])
            );
        }
    }
}
