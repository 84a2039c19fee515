use serde::{Deserialize, Serialize};
use xi_rope::{Rope, RopeInfo, delta::Delta, delta::DeltaElement};

use crate::error::OptionsError;
use crate::parsing::rope::position_at;
use crate::tree::Position;

/// One contiguous replacement, tree-sitter style.
///
/// `start_byte..old_end_byte` of the old text became
/// `start_byte..new_end_byte` of the new text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Position,
    pub old_end_position: Position,
    pub new_end_position: Position,
}

/// The short form: `old_length` bytes at `start` replaced by `new_length` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleEdit {
    pub start: usize,
    pub old_length: usize,
    pub new_length: usize,
}

/// Either edit form, as accepted by
/// [`IncrementalParser::edit`](super::IncrementalParser::edit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditInput {
    Full(Edit),
    Simple(SimpleEdit),
}

impl From<Edit> for EditInput {
    fn from(e: Edit) -> Self {
        EditInput::Full(e)
    }
}

impl From<SimpleEdit> for EditInput {
    fn from(e: SimpleEdit) -> Self {
        EditInput::Simple(e)
    }
}

impl Edit {
    /// Normalizes the short form against the text it applies to.
    ///
    /// The inserted text is unknown here, so `new_end_position` assumes it
    /// has no line breaks; [`Edit::locate`] fixes it once the new text is
    /// available.
    pub fn from_simple(simple: SimpleEdit, old: &Rope) -> Edit {
        let start_position = position_at(old, simple.start);
        let new_end_byte = simple.start + simple.new_length;
        Edit {
            start_byte: simple.start,
            old_end_byte: simple.start + simple.old_length,
            new_end_byte,
            start_position,
            old_end_position: position_at(old, simple.start + simple.old_length),
            new_end_position: Position::new(
                start_position.line,
                start_position.column + simple.new_length,
                new_end_byte,
            ),
        }
    }

    /// The byte offsets of the short form, positions left at zero.
    /// `None` when the end offsets overflow.
    pub fn from_bytes(simple: SimpleEdit) -> Option<Edit> {
        Some(Edit {
            start_byte: simple.start,
            old_end_byte: simple.start.checked_add(simple.old_length)?,
            new_end_byte: simple.start.checked_add(simple.new_length)?,
            ..Edit::default()
        })
    }

    /// Recomputes all three positions from the old text and the new one.
    /// The byte offsets must lie on char boundaries of both.
    pub fn locate(&mut self, old: &Rope, new: &str) {
        self.start_position = position_at(old, self.start_byte);
        self.old_end_position = position_at(old, self.old_end_byte);
        self.new_end_position = self
            .start_position
            .advance(&new[self.start_byte..self.new_end_byte]);
    }

    /// Length change in bytes.
    pub fn delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    pub fn old_len(&self) -> usize {
        self.old_end_byte - self.start_byte
    }

    pub fn new_len(&self) -> usize {
        self.new_end_byte - self.start_byte
    }

    /// Whether applying this edit to `old` can produce `new`: bounds, char
    /// boundaries, and untouched prefix and suffix all agree.
    pub fn is_consistent(&self, old: &str, new: &str) -> bool {
        let Edit {
            start_byte: s,
            old_end_byte: oe,
            new_end_byte: ne,
            ..
        } = *self;
        s <= oe
            && s <= ne
            && oe <= old.len()
            && ne <= new.len()
            && old.len() - oe == new.len() - ne
            && old.is_char_boundary(s)
            && old.is_char_boundary(oe)
            && new.is_char_boundary(s)
            && new.is_char_boundary(ne)
            && old.as_bytes()[..s] == new.as_bytes()[..s]
            && old.as_bytes()[oe..] == new.as_bytes()[ne..]
    }

    /// Composes edits given in sequence, each in the coordinates of the
    /// text the previous ones produced, into one edit of the original text.
    /// Positions are left for [`Edit::locate`].
    pub fn merge(edits: &[Edit]) -> Option<Edit> {
        let (first, rest) = edits.split_first()?;
        let (mut start, mut old_end, mut new_end) =
            (first.start_byte, first.old_end_byte, first.new_end_byte);
        for e in rest {
            // Where e's old end lies in the original text.
            let orig_end = if e.old_end_byte >= new_end {
                old_end + (e.old_end_byte - new_end)
            } else {
                old_end
            };
            let covered = new_end.max(e.old_end_byte);
            start = start.min(e.start_byte);
            old_end = old_end.max(orig_end);
            new_end = covered + e.new_end_byte - e.old_end_byte;
        }
        log::trace!(
            "merged {} edits into {start}..{old_end} -> {start}..{new_end}",
            edits.len()
        );
        Some(Edit {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            ..Edit::default()
        })
    }

    /// Converts a rope delta into sequential edits, one per insertion or
    /// deleted gap.
    pub fn from_delta(delta: &Delta<RopeInfo>, old: &Rope) -> Vec<Edit> {
        let mut edits = Vec::new();
        let mut old_pos = 0usize;
        // Net length change of the edits emitted so far.
        let mut shift = 0isize;
        let mut push = |old_start: usize, old_end: usize, inserted: usize, shift: &mut isize| {
            let start = old_start.saturating_add_signed(*shift);
            edits.push(Edit {
                start_byte: start,
                old_end_byte: start + (old_end - old_start),
                new_end_byte: start + inserted,
                start_position: position_at(old, old_start),
                old_end_position: position_at(old, old_end),
                new_end_position: Position::default(),
            });
            *shift += inserted as isize - (old_end - old_start) as isize;
        };
        for op in &delta.els {
            match op {
                DeltaElement::Copy(from, to) => {
                    if old_pos < *from {
                        push(old_pos, *from, 0, &mut shift);
                    }
                    old_pos = *to;
                }
                DeltaElement::Insert(node) => push(old_pos, old_pos, node.len(), &mut shift),
            }
        }
        if old_pos < delta.base_len {
            push(old_pos, delta.base_len, 0, &mut shift);
        }
        edits
    }
}

/// Diffs two texts by longest common prefix and suffix.
///
/// Both ends are kept on char boundaries, and the suffix never overlaps the
/// prefix.
pub fn detect_edit(old: &str, new: &str) -> Edit {
    let prefix = common_prefix(old, new);
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = common_suffix(&old[prefix..], &new[prefix..], max_suffix);
    let start = Position::ZERO.advance(&old[..prefix]);
    Edit {
        start_byte: prefix,
        old_end_byte: old.len() - suffix,
        new_end_byte: new.len() - suffix,
        start_position: start,
        old_end_position: start.advance(&old[prefix..old.len() - suffix]),
        new_end_position: start.advance(&new[prefix..new.len() - suffix]),
    }
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or(a.len().min(b.len()), |((i, _), _)| i)
}

fn common_suffix(a: &str, b: &str, max: usize) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().rev().zip(b.chars().rev()) {
        if ca != cb || len + ca.len_utf8() > max {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

/// When to prefer splicing over a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncrementalConfig {
    /// Largest affected share of the new document, in `(0, 1]`, that is
    /// still reparsed incrementally.
    pub threshold: f64,
    /// Documents shorter than this many bytes are always parsed in full.
    pub min_document_size: usize,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            threshold: 0.30,
            min_document_size: 1024,
        }
    }
}

impl IncrementalConfig {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.threshold > 0.0 && self.threshold <= 1.0 {
            Ok(())
        } else {
            Err(OptionsError::Threshold(self.threshold))
        }
    }

    /// `affected` bytes of a `document_length`-byte document.
    pub fn allows(&self, affected: usize, document_length: usize) -> bool {
        document_length >= self.min_document_size
            && (affected as f64) < self.threshold * document_length as f64
    }

    pub fn should_use_incremental(&self, edit: &Edit, document_length: usize) -> bool {
        self.allows(edit.old_len().max(edit.new_len()), document_length)
    }
}

/// [`IncrementalConfig::should_use_incremental`] with the default config.
pub fn should_use_incremental(edit: &Edit, document_length: usize) -> bool {
    IncrementalConfig::default().should_use_incremental(edit, document_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn detects_replacement() {
        let e = detect_edit("Hello World", "Hello Earth");
        assert_eq!(
            (e.start_byte, e.old_end_byte, e.new_end_byte),
            (6, 11, 11)
        );
        assert_eq!(e.start_position, Position::new(0, 6, 6));
    }

    #[rstest]
    #[case("abc", "abc", (3, 3, 3))]
    #[case("abc", "abXc", (2, 2, 3))]
    #[case("aaa", "aa", (2, 3, 2))]
    #[case("", "new", (0, 0, 3))]
    #[case("héllo", "hallo", (1, 3, 2))]
    fn detect_cases(#[case] old: &str, #[case] new: &str, #[case] expected: (usize, usize, usize)) {
        let e = detect_edit(old, new);
        assert_eq!((e.start_byte, e.old_end_byte, e.new_end_byte), expected);
        assert!(e.is_consistent(old, new));
    }

    #[test]
    fn detect_positions_span_lines() {
        let e = detect_edit("a\nb\nc\n", "a\nXY\nZ\nc\n");
        assert_eq!(e.start_position, Position::new(1, 0, 2));
        assert_eq!(e.old_end_position, Position::new(1, 1, 3));
        assert_eq!(e.new_end_position, Position::new(2, 1, 7));
    }

    #[test]
    fn simple_edit_normalizes() {
        let rope = Rope::from("ab\ncd\n");
        let e = Edit::from_simple(
            SimpleEdit {
                start: 4,
                old_length: 1,
                new_length: 3,
            },
            &rope,
        );
        assert_eq!((e.start_byte, e.old_end_byte, e.new_end_byte), (4, 5, 7));
        assert_eq!(e.start_position, Position::new(1, 1, 4));
        assert_eq!(e.old_end_position, Position::new(1, 2, 5));
        assert_eq!(e.delta(), 2);
    }

    #[test]
    fn byte_form_overflow_is_none() {
        let simple = SimpleEdit {
            start: usize::MAX,
            old_length: 1,
            new_length: 0,
        };
        assert_eq!(Edit::from_bytes(simple), None);
        let e = Edit::from_bytes(SimpleEdit {
            start: 2,
            old_length: 1,
            new_length: 4,
        })
        .unwrap();
        assert_eq!((e.start_byte, e.old_end_byte, e.new_end_byte), (2, 3, 6));
    }

    #[test]
    fn locate_uses_both_texts() {
        let old = Rope::from("aé\nb\n");
        let mut e = raw(4, 5, 7);
        e.locate(&old, "aé\nX\nY\n");
        assert_eq!(e.start_position, Position::new(1, 0, 4));
        assert_eq!(e.old_end_position, Position::new(1, 1, 5));
        assert_eq!(e.new_end_position, Position::new(2, 1, 7));
    }

    fn apply(text: &str, e: &Edit, insert: &str) -> String {
        format!("{}{}{}", &text[..e.start_byte], insert, &text[e.old_end_byte..])
    }

    fn raw(start: usize, old_end: usize, new_end: usize) -> Edit {
        Edit {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            ..Edit::default()
        }
    }

    #[rstest]
    // Two insertions, second after the first.
    #[case(vec![(raw(2, 2, 4), "XY"), (raw(8, 8, 9), "Z")])]
    // Second edit before the first.
    #[case(vec![(raw(8, 9, 8), ""), (raw(1, 2, 4), "QQ")])]
    // Overlapping: delete across the first insertion.
    #[case(vec![(raw(3, 3, 6), "abc"), (raw(4, 8, 4), "")])]
    // Second edit swallows the first entirely.
    #[case(vec![(raw(5, 6, 7), "xy"), (raw(2, 10, 3), "!")])]
    fn merged_edit_covers_sequence(#[case] steps: Vec<(Edit, &str)>) {
        let original = "0123456789abcdef";
        let mut text = original.to_string();
        for (e, insert) in &steps {
            text = apply(&text, e, insert);
        }
        let edits: Vec<Edit> = steps.iter().map(|(e, _)| *e).collect();
        let merged = Edit::merge(&edits).unwrap();
        assert!(merged.is_consistent(original, &text), "{merged:?} for {text:?}");
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert_eq!(Edit::merge(&[]), None);
    }

    #[test]
    fn inconsistent_edit_is_detected() {
        let e = raw(0, 1, 1);
        assert!(!e.is_consistent("abc", "abcd"));
        assert!(!raw(1, 2, 2).is_consistent("abc", "xbc"));
    }

    #[test]
    fn delta_becomes_sequential_edits() {
        let old = Rope::from("hello world");
        let mut builder = xi_rope::delta::Builder::new(old.len());
        builder.replace(0..1, Rope::from("J"));
        builder.delete(5..6);
        let delta = builder.build();
        let new = delta.apply(&old);
        let edits = Edit::from_delta(&delta, &old);
        let merged = Edit::merge(&edits).unwrap();
        assert!(merged.is_consistent(&old.to_string(), &new.to_string()));
    }

    #[test]
    fn incremental_decision() {
        let config = IncrementalConfig::default();
        let small = raw(100, 105, 105);
        assert!(config.should_use_incremental(&small, 150_000));
        assert!(!config.should_use_incremental(&small, 500));
        assert!(!config.should_use_incremental(&raw(0, 60_000, 0), 150_000));
        assert!(should_use_incremental(&small, 2048));
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(0.3, true)]
    #[case(1.0, true)]
    #[case(1.5, false)]
    fn threshold_bounds(#[case] threshold: f64, #[case] ok: bool) {
        let config = IncrementalConfig {
            threshold,
            ..IncrementalConfig::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }
}
