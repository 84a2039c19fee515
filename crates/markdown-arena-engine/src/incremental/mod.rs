//! # Incremental Re-parsing
//!
//! [`IncrementalParser`] keeps one document's tree alive across edits.
//! Edits are buffered with [`IncrementalParser::edit`] and applied together
//! by [`IncrementalParser::apply_edits`], which either splices a re-parsed
//! region into the existing arena or falls back to a full parse.
//!
//! Splicing works on top-level blocks only:
//!
//! 1. The pending edits are merged into one covering [`Edit`].
//! 2. The region starts at the top-level block before the one holding the
//!    edit, so constructs that look back one line (setext underlines) are
//!    re-read.
//! 3. Re-tokenizing runs from the region start until a token ends on a line
//!    start that was also a block boundary in the old text, at or after the
//!    edit. Everything from there on is the old tree with shifted spans.
//! 4. The old nodes of the region are replaced by the new ones in place,
//!    and later ids move by the size difference, so ids stay in pre-order.
//!
//! The query index is rebuilt from scratch after every apply.

pub mod edit;

use std::ops::Range;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serde::Serialize;
use xi_rope::{Rope, delta::Builder};

use crate::error::{IncrementalError, OptionsError};
use crate::index::QueryIndex;
use crate::parsing::blocks::BlockTokenKind;
use crate::parsing::rope::position_at;
use crate::parsing::{ParseOptions, Parser};
use crate::tree::{Node, NodeId, Position, Shift, Span, Tree};

pub use edit::{Edit, EditInput, IncrementalConfig, SimpleEdit, detect_edit, should_use_incremental};

/// What one [`IncrementalParser::apply_edits`] did. Observational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalStats {
    pub total_nodes: usize,
    /// Old nodes thrown away.
    pub affected_nodes: usize,
    /// Nodes carried over from the previous tree, root included.
    pub reused_nodes: usize,
    pub new_nodes: usize,
    pub reparse_time_ms: f64,
    /// Measured on the full path, otherwise estimated from the last full
    /// parse scaled to the new length.
    pub full_parse_time_ms: f64,
    pub speedup: f64,
    pub incremental: bool,
    /// Re-tokenized byte range of the new text, on the incremental path.
    pub region: Option<Range<usize>>,
}

/// Where a splice starts, decided before any tokenizing.
#[derive(Debug, Clone, Copy)]
struct Region {
    edit: Edit,
    /// First top-level child that is re-parsed.
    from: usize,
    start: Position,
}

pub struct IncrementalParser {
    parser: Parser,
    config: IncrementalConfig,
    tree: Option<Tree>,
    /// The baseline text, i.e. the source of `tree`.
    rope: Rope,
    pending: Vec<Edit>,
    /// Length of the text the pending edits produce.
    pending_len: usize,
    last_stats: Option<IncrementalStats>,
    /// Milliseconds per byte of the last full parse.
    full_parse_rate: f64,
}

impl Default for IncrementalParser {
    fn default() -> Self {
        Self {
            parser: Parser::default(),
            config: IncrementalConfig::default(),
            tree: None,
            rope: Rope::from(""),
            pending: Vec::new(),
            pending_len: 0,
            last_stats: None,
            full_parse_rate: 0.0,
        }
    }
}

impl IncrementalParser {
    pub fn new(options: ParseOptions, config: IncrementalConfig) -> Result<Self, OptionsError> {
        config.validate()?;
        Ok(Self {
            parser: Parser::new(options)?,
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &IncrementalConfig {
        &self.config
    }

    /// Full parse of `source`, which becomes the baseline. Drops any
    /// pending edits.
    pub fn parse(&mut self, source: &str) -> &Tree {
        if let Some(old) = self.tree.take() {
            self.parser.recycle(old);
        }
        let started = Instant::now();
        let tree = self.parser.parse(source);
        self.note_full_parse(started.elapsed(), source.len());
        self.rope = Rope::from(source);
        self.pending.clear();
        self.pending_len = source.len();
        self.tree.insert(tree)
    }

    /// Buffers one edit, in the coordinates of the text the previously
    /// buffered edits produce. Nothing is re-parsed until
    /// [`IncrementalParser::apply_edits`].
    pub fn edit(&mut self, edit: impl Into<EditInput>) -> Result<(), IncrementalError> {
        if self.tree.is_none() {
            return Err(IncrementalError::NotParsed);
        }
        // Only byte offsets are kept while buffering. Positions are resolved
        // against the baseline once the edits are merged.
        let out_of_bounds = |start: usize, end: usize| IncrementalError::EditOutOfBounds {
            start,
            end,
            len: self.pending_len,
        };
        let edit = match edit.into() {
            EditInput::Full(e) => e,
            EditInput::Simple(s) => {
                Edit::from_bytes(s).ok_or_else(|| out_of_bounds(s.start, usize::MAX))?
            }
        };
        if edit.start_byte > edit.old_end_byte
            || edit.start_byte > edit.new_end_byte
            || edit.old_end_byte > self.pending_len
        {
            return Err(out_of_bounds(edit.start_byte, edit.old_end_byte));
        }
        let pending_len = (self.pending_len - edit.old_len())
            .checked_add(edit.new_len())
            .ok_or_else(|| out_of_bounds(edit.start_byte, edit.new_end_byte))?;
        trace!(
            "edit {}..{} -> {}..{}",
            edit.start_byte, edit.old_end_byte, edit.start_byte, edit.new_end_byte
        );
        self.pending_len = pending_len;
        self.pending.push(edit);
        Ok(())
    }

    pub fn pending_edits(&self) -> &[Edit] {
        &self.pending
    }

    /// Brings the tree up to date with `new_text`, using the buffered edits
    /// or, when there are none, an edit detected by diffing.
    pub fn apply_edits(&mut self, new_text: &str) -> Result<IncrementalStats, IncrementalError> {
        let Some(mut old) = self.tree.take() else {
            return Err(IncrementalError::NotParsed);
        };
        let started = Instant::now();
        let old_source = std::mem::take(&mut old.meta.source);
        let edits = std::mem::take(&mut self.pending);

        let edit = if edits.is_empty() {
            Some(detect_edit(&old_source, new_text))
        } else {
            Edit::merge(&edits).filter(|e| e.is_consistent(&old_source, new_text))
        };
        let region = match edit {
            Some(mut edit) => {
                edit.locate(&self.rope, new_text);
                self.plan(&old, edit, new_text.len())
            }
            None => {
                debug!(
                    "{} pending edits do not produce the new text; parsing in full",
                    edits.len()
                );
                None
            }
        };

        let (mut tree, mut stats) = match region {
            Some(region) => self.splice(old, &old_source, new_text, region),
            None => {
                let affected_nodes = old.len();
                self.parser.recycle(old);
                let tree = self.parser.parse(new_text);
                self.rope = Rope::from(new_text);
                let stats = IncrementalStats {
                    total_nodes: tree.len(),
                    affected_nodes,
                    reused_nodes: 0,
                    new_nodes: tree.len(),
                    reparse_time_ms: 0.0,
                    full_parse_time_ms: 0.0,
                    speedup: 1.0,
                    incremental: false,
                    region: None,
                };
                (tree, stats)
            }
        };
        tree.set_index(QueryIndex::from_tree(&tree));
        debug_assert!(tree.check_invariants().is_ok());

        let elapsed = started.elapsed();
        stats.reparse_time_ms = elapsed.as_secs_f64() * 1000.0;
        if stats.incremental {
            stats.full_parse_time_ms = self.full_parse_rate * new_text.len() as f64;
        } else {
            self.note_full_parse(elapsed, new_text.len());
            stats.full_parse_time_ms = stats.reparse_time_ms;
        }
        stats.speedup = if stats.reparse_time_ms > 0.0 {
            stats.full_parse_time_ms / stats.reparse_time_ms
        } else {
            1.0
        };

        self.pending_len = new_text.len();
        self.tree = Some(tree);
        self.last_stats = Some(stats.clone());
        Ok(stats)
    }

    /// [`IncrementalParser::edit`] followed by [`IncrementalParser::apply_edits`].
    pub fn update(
        &mut self,
        new_text: &str,
        edit: impl Into<EditInput>,
    ) -> Result<&Tree, IncrementalError> {
        self.edit(edit)?;
        self.apply_edits(new_text)?;
        self.tree.as_ref().ok_or(IncrementalError::NotParsed)
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Hands the current tree to the caller, leaving the parser unparsed.
    pub fn take_tree(&mut self) -> Option<Tree> {
        self.pending.clear();
        self.tree.take()
    }

    /// The current tree's index. Always built after an apply.
    pub fn index(&mut self) -> Option<&QueryIndex> {
        self.tree.as_mut().map(Tree::index)
    }

    pub fn last_stats(&self) -> Option<&IncrementalStats> {
        self.last_stats.as_ref()
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    fn note_full_parse(&mut self, elapsed: Duration, len: usize) {
        if len > 0 {
            self.full_parse_rate = elapsed.as_secs_f64() * 1000.0 / len as f64;
        }
    }

    /// Picks the region start and decides between splicing and a full
    /// parse. `None` means full parse.
    fn plan(&self, old: &Tree, edit: Edit, new_len: usize) -> Option<Region> {
        let children = old.children_of(old.root);
        let span = |i: usize| old.nodes[children[i].0].span;
        let first_after = |offset: usize| {
            children.partition_point(|&c| old.nodes[c.0].span.start.offset <= offset)
        };

        let (from, start) = match first_after(edit.start_byte) {
            0 => (0, Position::ZERO),
            idx => {
                let c = idx - 1;
                let from = if edit.start_byte < span(c).end.offset {
                    c.saturating_sub(1)
                } else {
                    c
                };
                (from, span(from).start)
            }
        };
        let old_end = match first_after(edit.old_end_byte) {
            0 => edit.old_end_byte,
            idx => span(idx - 1).end.offset.max(edit.old_end_byte),
        };
        let affected = (old_end - start.offset).saturating_add_signed(edit.delta());
        let incremental = self.config.allows(affected, new_len);
        debug!(
            "edit {}..{} (+{}): region from {} covers ~{} of {} bytes ({:.3}), {}",
            edit.start_byte,
            edit.old_end_byte,
            edit.new_len(),
            start.offset,
            affected,
            new_len,
            affected as f64 / new_len.max(1) as f64,
            if incremental { "splicing" } else { "full parse" }
        );
        incremental.then_some(Region { edit, from, start })
    }

    fn splice(
        &mut self,
        mut old: Tree,
        old_source: &str,
        new_text: &str,
        region: Region,
    ) -> (Tree, IncrementalStats) {
        let Region { edit, from, start } = region;
        let delta = edit.delta();
        let children = std::mem::take(&mut old.nodes[old.root.0].children);
        let batching = self.parser.options().use_batch_tokenizer;

        let tokens = self.parser.tokens_from(new_text, start);
        let mut builder = self.parser.builder("");
        let mut sync_new = new_text.len();
        let mut sync_old = old_source.len();
        for token in tokens {
            let end = token.span.end.offset;
            // Batched paragraph lines may still coalesce with what follows.
            let open_ended = batching && matches!(token.kind, BlockTokenKind::Paragraph { .. });
            builder.push_block(&token);
            if end < edit.new_end_byte || open_ended {
                continue;
            }
            let end_old = end.wrapping_add_signed(-delta);
            if is_boundary(&old, &children, old_source, end_old) {
                trace!("resynchronized at {end} (old {end_old})");
                sync_new = end;
                sync_old = end_old;
                break;
            }
        }
        let scratch = builder.finish().nodes;

        let until = children.partition_point(|&c| old.nodes[c.0].span.start.offset < sync_old);
        let first_id = children.get(from).map_or(old.nodes.len(), |c| c.0);
        let end_id = children.get(until).map_or(old.nodes.len(), |c| c.0);
        let added = scratch.len() - 1;
        let id_shift = added as isize - (end_id - first_id) as isize;
        let shift = Shift {
            bytes: delta,
            lines: line_count(&new_text[edit.start_byte..edit.new_end_byte]) as isize
                - line_count(&old_source[edit.start_byte..edit.old_end_byte]) as isize,
        };

        let mut nodes = std::mem::take(&mut old.nodes);
        let tail = nodes.split_off(end_id);
        let removed = nodes.split_off(first_id);
        nodes.reserve(added + tail.len());

        let fresh = |id: NodeId| NodeId(id.0 - 1 + first_id);
        let mut top = Vec::new();
        for mut node in scratch.into_iter().skip(1) {
            let id = fresh(node.id);
            node.id = id;
            node.parent = node.parent.map(|p| {
                if p == NodeId::ROOT {
                    top.push(id);
                    NodeId::ROOT
                } else {
                    fresh(p)
                }
            });
            for c in &mut node.children {
                *c = fresh(*c);
            }
            nodes.push(node);
        }

        let moved = |id: NodeId| NodeId(id.0.wrapping_add_signed(id_shift));
        for mut node in tail {
            node.id = moved(node.id);
            node.parent = node
                .parent
                .map(|p| if p == NodeId::ROOT { p } else { moved(p) });
            for c in &mut node.children {
                *c = moved(*c);
            }
            node.span = node.span.shifted(shift);
            nodes.push(node);
        }

        if edit.start_byte != edit.old_end_byte || edit.start_byte != edit.new_end_byte {
            let mut builder = Builder::new(self.rope.len());
            builder.replace(
                edit.start_byte..edit.old_end_byte,
                Rope::from(&new_text[edit.start_byte..edit.new_end_byte]),
            );
            self.rope = builder.build().apply(&self.rope);
        }

        let mut root_children = children[..from].to_vec();
        root_children.extend(top);
        root_children.extend(children[until..].iter().map(|&c| moved(c)));
        let root: &mut Node = &mut nodes[NodeId::ROOT.0];
        root.children = root_children;
        root.span = Span::new(Position::ZERO, position_at(&self.rope, new_text.len()));

        old.nodes = nodes;
        old.meta.source = new_text.to_string();
        old.invalidate_index();

        let stats = IncrementalStats {
            total_nodes: old.len(),
            affected_nodes: removed.len(),
            reused_nodes: old.len() - added,
            new_nodes: added,
            reparse_time_ms: 0.0,
            full_parse_time_ms: 0.0,
            speedup: 1.0,
            incremental: true,
            region: Some(start.offset..sync_new),
        };
        self.parser.recycle_nodes(removed);
        (old, stats)
    }
}

/// Whether old-text `offset` is somewhere tokenizing could have restarted:
/// the end of the text, or a line start that begins a top-level block or
/// lies between blocks.
fn is_boundary(old: &Tree, children: &[NodeId], source: &str, offset: usize) -> bool {
    if offset == source.len() {
        return true;
    }
    let line_start = offset == 0 || source.as_bytes().get(offset - 1) == Some(&b'\n');
    if !line_start {
        return false;
    }
    let idx = children.partition_point(|&c| old.nodes[c.0].span.start.offset <= offset);
    match idx.checked_sub(1).map(|i| old.nodes[children[i].0].span) {
        Some(span) => span.start.offset == offset || span.end.offset <= offset,
        None => true,
    }
}

fn line_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::snapshot;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;

    fn small_config() -> IncrementalConfig {
        IncrementalConfig {
            threshold: 0.9,
            min_document_size: 0,
        }
    }

    fn parser() -> IncrementalParser {
        IncrementalParser::new(ParseOptions::default(), small_config()).unwrap()
    }

    fn assert_matches_full_parse(tree: &Tree) {
        snapshot::invariants(tree);
        tree.check_pre_order().unwrap();
        let full = crate::parsing::parse(tree.source());
        assert_eq!(snapshot::outline(tree), snapshot::outline(&full));
    }

    #[test]
    fn edit_before_parse_fails() {
        let mut p = parser();
        assert_eq!(
            p.edit(SimpleEdit {
                start: 0,
                old_length: 0,
                new_length: 1
            }),
            Err(IncrementalError::NotParsed)
        );
        assert_eq!(p.apply_edits("x"), Err(IncrementalError::NotParsed));
    }

    #[test]
    fn out_of_bounds_edit_is_rejected() {
        let mut p = parser();
        p.parse("abc\n");
        let err = p
            .edit(SimpleEdit {
                start: 2,
                old_length: 5,
                new_length: 0,
            })
            .unwrap_err();
        assert_eq!(
            err,
            IncrementalError::EditOutOfBounds {
                start: 2,
                end: 7,
                len: 4
            }
        );
        assert!(p.pending_edits().is_empty());
    }

    #[test]
    fn edit_only_buffers() {
        let mut p = parser();
        p.parse("# a\n\nb\n");
        p.edit(SimpleEdit {
            start: 2,
            old_length: 1,
            new_length: 2,
        })
        .unwrap();
        assert_eq!(p.pending_edits().len(), 1);
        assert_eq!(p.tree().unwrap().source(), "# a\n\nb\n");
    }

    #[test]
    fn splices_a_middle_block() {
        let old = "# one\n\npara two\n\n- item\n\n> quote\n";
        let new = "# one\n\npara *2*\n\n- item\n\n> quote\n";
        let mut p = parser();
        p.parse(old);
        let edit = detect_edit(old, new);
        let tree = p.update(new, edit).unwrap();
        assert_matches_full_parse(tree);
        let stats = p.last_stats().unwrap();
        assert!(stats.incremental);
        assert!(stats.reused_nodes > 0);
        assert_eq!(stats.total_nodes, p.tree().unwrap().len());
    }

    #[test]
    fn inserted_lines_shift_following_blocks() {
        let old = "a\n\nb\n\nc\n";
        let new = "a\n\nb\nmore\nlines\n\nc\n";
        let mut p = parser();
        p.parse(old);
        let tree = p.update(new, detect_edit(old, new)).unwrap();
        assert_matches_full_parse(tree);
        let last = *tree.root_node().children.last().unwrap();
        assert_eq!(tree.nodes[last.0].span.start, Position::new(6, 0, 17));
    }

    #[test]
    fn setext_underline_rereads_previous_line() {
        let old = "Title\nbody\n\nafter\n";
        let new = "Title\n===\n\nafter\n";
        let mut p = parser();
        p.parse(old);
        let tree = p.update(new, detect_edit(old, new)).unwrap();
        assert_matches_full_parse(tree);
        let first = tree.root_node().children[0];
        assert_eq!(tree.nodes[first.0].kind(), NodeKind::Heading);
    }

    #[test]
    fn opening_a_fence_swallows_the_rest() {
        let old = "a\n\nb\n\nc\n";
        let new = "a\n\n```\nb\n\nc\n";
        let mut p = parser();
        p.parse(old);
        let tree = p.update(new, detect_edit(old, new)).unwrap();
        assert_matches_full_parse(tree);
    }

    #[test]
    fn several_pending_edits_are_merged() {
        let old = "# h\n\nfirst\n\nsecond\n\nthird\n\n# tail\n\nmore text here\n";
        let mut p = parser();
        p.parse(old);
        // "first" -> "1st", then "third" -> "3rd" in the shortened text.
        p.edit(SimpleEdit {
            start: 5,
            old_length: 5,
            new_length: 3,
        })
        .unwrap();
        p.edit(SimpleEdit {
            start: 18,
            old_length: 5,
            new_length: 3,
        })
        .unwrap();
        let new = "# h\n\n1st\n\nsecond\n\n3rd\n\n# tail\n\nmore text here\n";
        let stats = p.apply_edits(new).unwrap();
        assert!(stats.incremental);
        assert!(p.pending_edits().is_empty());
        assert_matches_full_parse(p.tree().unwrap());
    }

    #[test]
    fn later_edits_use_the_edited_coordinates() {
        let mut p = parser();
        p.parse("aé\n\nrest of it\n");
        // Insert "X" at 0, then "Y" at 2 of "Xaé...": offset 2 is inside the
        // `é` of the baseline but a char boundary of the edited text.
        for start in [0, 2] {
            p.edit(SimpleEdit {
                start,
                old_length: 0,
                new_length: 1,
            })
            .unwrap();
        }
        let stats = p.apply_edits("XaYé\n\nrest of it\n").unwrap();
        assert!(stats.incremental);
        let tree = p.tree().unwrap();
        assert_matches_full_parse(tree);
        assert_eq!(tree.text_content(tree.root_node().children[0]), "XaYé");
    }

    #[test]
    fn overflowing_edit_is_rejected() {
        let mut p = parser();
        p.parse("abc\n");
        let err = p
            .edit(SimpleEdit {
                start: 1,
                old_length: usize::MAX,
                new_length: 0,
            })
            .unwrap_err();
        assert!(matches!(err, IncrementalError::EditOutOfBounds { start: 1, .. }));
        assert!(p.pending_edits().is_empty());
    }

    #[test]
    fn inconsistent_edits_fall_back_to_full_parse() {
        let mut p = parser();
        p.parse("abc\n\ndef\n");
        p.edit(SimpleEdit {
            start: 0,
            old_length: 1,
            new_length: 1,
        })
        .unwrap();
        let stats = p.apply_edits("something else entirely\n").unwrap();
        assert!(!stats.incremental);
        assert_matches_full_parse(p.tree().unwrap());
    }

    #[test]
    fn small_documents_parse_in_full() {
        let mut p = IncrementalParser::default();
        p.parse("short\n");
        let stats = p.apply_edits("shorter\n").unwrap();
        assert!(!stats.incremental);
        assert_eq!(stats.reused_nodes, 0);
    }

    #[test]
    fn index_is_rebuilt_after_apply() {
        let mut p = parser();
        p.parse("para\n\ntext\n");
        p.apply_edits("# head\n\ntext\n").unwrap();
        assert!(p.tree().unwrap().cached_index().is_some());
        let headings = p.index().unwrap().find_by_type(NodeKind::Heading).unwrap();
        assert_eq!(headings.len(), 1);
    }

    #[test]
    fn deleting_everything() {
        let mut p = parser();
        p.parse("a\n\nb\n");
        let tree = p.update("", detect_edit("a\n\nb\n", "")).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_node().span.end, Position::ZERO);
    }

    #[test]
    fn appending_at_the_end() {
        let old = "a\n\nb";
        let new = "a\n\nb and more\n\n# c\n";
        let mut p = parser();
        p.parse(old);
        let tree = p.update(new, detect_edit(old, new)).unwrap();
        assert_matches_full_parse(tree);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let mut p = parser();
        p.parse("a\n\nb\n");
        let stats = p.apply_edits("a\n\nc\n").unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("reusedNodes").is_some());
        assert!(json.get("fullParseTimeMs").is_some());
    }
}
