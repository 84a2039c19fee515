//! Token → node lowering.
//!
//! Nodes are appended parent-first and children left to right, so a tree
//! built here has ids in document pre-order. Blank-line tokens never become
//! nodes.

use std::ops::Range;

use crate::parsing::blocks::{BlockToken, BlockTokenKind, TableRowToken};
use crate::parsing::inline::{InlineTokenKind, MAX_INLINE_DEPTH, plain_text, tokenize_range};
use crate::parsing::text::InlineText;
use crate::tree::{Alignment, Node, NodeData, NodeId, NodePool, Span, Tree};

/// Appends lowered block tokens under the root of a tree.
pub struct TreeBuilder<'p> {
    tree: Tree,
    pool: Option<&'p mut NodePool>,
}

impl<'p> TreeBuilder<'p> {
    pub fn new(tree: Tree, pool: Option<&'p mut NodePool>) -> Self {
        Self { tree, pool }
    }

    /// Lowers one block token. Returns the id of the new top-level node, or
    /// `None` for a blank line.
    pub fn push_block(&mut self, token: &BlockToken<'_>) -> Option<NodeId> {
        let root = self.tree.root;
        let span = token.span;
        let id = match &token.kind {
            BlockTokenKind::BlankLine => return None,
            BlockTokenKind::Heading {
                depth,
                setext,
                content,
            } => {
                let data = NodeData::Heading {
                    depth: *depth,
                    setext: *setext,
                };
                self.container(root, data, span, content)
            }
            BlockTokenKind::Paragraph { content } => {
                self.container(root, NodeData::Paragraph {}, span, content)
            }
            BlockTokenKind::Code {
                lang,
                meta,
                value,
                fenced,
                ..
            } => {
                let data = NodeData::Code {
                    lang: lang.clone(),
                    meta: meta.clone(),
                    value: value.clone(),
                    fenced: *fenced,
                };
                self.node(root, data, span)
            }
            BlockTokenKind::ListItem {
                ordered,
                marker,
                number,
                checked,
                content,
            } => {
                let data = NodeData::ListItem {
                    ordered: *ordered,
                    marker: *marker,
                    number: *number,
                    checked: *checked,
                };
                self.container(root, data, span, content)
            }
            BlockTokenKind::Blockquote { depth, content } => {
                self.container(root, NodeData::Blockquote { depth: *depth }, span, content)
            }
            BlockTokenKind::ThematicBreak => self.node(root, NodeData::ThematicBreak {}, span),
            BlockTokenKind::Table { align, rows } => {
                let table = self.node(
                    root,
                    NodeData::Table {
                        align: align.clone(),
                    },
                    span,
                );
                for (i, row) in rows.iter().enumerate() {
                    self.table_row(table, row, i == 0, align);
                }
                table
            }
            BlockTokenKind::HtmlBlock { value } => self.node(
                root,
                NodeData::HtmlBlock {
                    value: value.clone(),
                },
                span,
            ),
            BlockTokenKind::Definition { label, url, title } => self.node(
                root,
                NodeData::Definition {
                    label: label.clone(),
                    url: url.clone(),
                    title: title.clone(),
                },
                span,
            ),
        };
        Some(id)
    }

    /// Lowers every token in order.
    pub fn extend<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = BlockToken<'a>>,
    {
        for token in tokens {
            self.push_block(&token);
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn finish(self) -> Tree {
        self.tree
    }

    fn node(&mut self, parent: NodeId, data: NodeData, span: Span) -> NodeId {
        let node = match self.pool.as_deref_mut() {
            Some(pool) => {
                let mut node = pool.acquire(data.kind());
                node.data = data;
                node.span = span;
                node
            }
            None => Node::new(data, span),
        };
        let id = self.tree.add_node(node);
        self.tree.append_child(parent, id);
        id
    }

    fn container(
        &mut self,
        parent: NodeId,
        data: NodeData,
        span: Span,
        content: &InlineText,
    ) -> NodeId {
        let id = self.node(parent, data, span);
        self.inline(id, content, 0..content.len(), 0);
        id
    }

    fn table_row(&mut self, table: NodeId, row: &TableRowToken, header: bool, align: &[Alignment]) {
        let id = self.node(table, NodeData::TableRow { header }, row.span);
        for (col, cell) in row.cells.iter().enumerate() {
            let align = align.get(col).copied().unwrap_or_default();
            self.container(id, NodeData::TableCell { align }, cell.span, &cell.content);
        }
    }

    /// Lowers the inline tokens of `range` under `parent`.
    fn inline(&mut self, parent: NodeId, content: &InlineText, range: Range<usize>, depth: usize) {
        for token in tokenize_range(content, range) {
            let span = token.span;
            let nested = token.kind.inner();
            if nested.is_some() && depth >= MAX_INLINE_DEPTH {
                let value = token.raw.to_string();
                self.node(parent, NodeData::Text { value }, span);
                continue;
            }
            let data = match token.kind {
                InlineTokenKind::Text { value } => NodeData::Text { value },
                InlineTokenKind::CodeSpan { value } => NodeData::InlineCode { value },
                InlineTokenKind::Emphasis { .. } => NodeData::Emphasis {},
                InlineTokenKind::Strong { .. } => NodeData::Strong {},
                InlineTokenKind::Strikethrough { .. } => NodeData::Delete {},
                InlineTokenKind::Link { url, title, .. } => NodeData::Link {
                    url,
                    title,
                    autolink: false,
                },
                InlineTokenKind::Image { inner, url, title } => {
                    let alt = plain_text(content, inner);
                    self.node(parent, NodeData::Image { url, title, alt }, span);
                    continue;
                }
                InlineTokenKind::Autolink { url, text } => {
                    let link = self.node(
                        parent,
                        NodeData::Link {
                            url,
                            title: None,
                            autolink: true,
                        },
                        span,
                    );
                    let text_span =
                        Span::new(content.position_at(text.start), content.position_at(text.end));
                    let value = content.as_str()[text].to_string();
                    self.node(link, NodeData::Text { value }, text_span);
                    continue;
                }
                InlineTokenKind::HardBreak => NodeData::Break { hard: true },
                InlineTokenKind::SoftBreak => NodeData::Break { hard: false },
            };
            let id = self.node(parent, data, span);
            if let Some(inner) = nested {
                self.inline(id, content, inner, depth + 1);
            }
        }
    }
}

/// Builds a complete tree from `tokens`.
pub fn build_tree<'a, I>(
    language: &str,
    source: &str,
    tokens: I,
    pool: Option<&mut NodePool>,
) -> Tree
where
    I: IntoIterator<Item = BlockToken<'a>>,
{
    let mut builder = TreeBuilder::new(Tree::new(language, source), pool);
    builder.extend(tokens);
    builder.finish()
}
