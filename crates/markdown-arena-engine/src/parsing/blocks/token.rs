use crate::{
    parsing::text::InlineText,
    tree::{Alignment, Position, Span},
};

/// A block-level lexical unit. Lives for one parse pass only.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockToken<'a> {
    pub kind: BlockTokenKind,
    /// Covers every consumed line including its terminator.
    pub span: Span,
    /// Verbatim source slice for `span`.
    pub raw: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockTokenKind {
    BlankLine,
    Heading {
        depth: u8,
        setext: bool,
        content: InlineText,
    },
    Paragraph {
        content: InlineText,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
        fenced: bool,
        /// False for a fence that ran to end of input.
        closed: bool,
    },
    ListItem {
        ordered: bool,
        marker: char,
        number: Option<u64>,
        checked: Option<bool>,
        content: InlineText,
    },
    Blockquote {
        depth: u8,
        content: InlineText,
    },
    ThematicBreak,
    Table {
        align: Vec<Alignment>,
        /// Header row first. The delimiter row is not included.
        rows: Vec<TableRowToken>,
    },
    HtmlBlock {
        value: String,
    },
    Definition {
        label: String,
        url: String,
        title: Option<String>,
    },
}

impl BlockTokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockTokenKind::BlankLine => "blankLine",
            BlockTokenKind::Heading { .. } => "heading",
            BlockTokenKind::Paragraph { .. } => "paragraph",
            BlockTokenKind::Code { .. } => "code",
            BlockTokenKind::ListItem { .. } => "listItem",
            BlockTokenKind::Blockquote { .. } => "blockquote",
            BlockTokenKind::ThematicBreak => "thematicBreak",
            BlockTokenKind::Table { .. } => "table",
            BlockTokenKind::HtmlBlock { .. } => "htmlBlock",
            BlockTokenKind::Definition { .. } => "definition",
        }
    }

    /// The text the inline tokenizer runs over, for kinds that have one.
    pub fn content(&self) -> Option<&InlineText> {
        match self {
            BlockTokenKind::Heading { content, .. }
            | BlockTokenKind::Paragraph { content }
            | BlockTokenKind::ListItem { content, .. }
            | BlockTokenKind::Blockquote { content, .. } => Some(content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRowToken {
    /// The row's line without its terminator.
    pub span: Span,
    pub cells: Vec<TableCellToken>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCellToken {
    /// Trimmed cell content. Empty (at the row end) for padded cells.
    pub span: Span,
    pub content: InlineText,
}

/// What a block kind scanner recognised: the token kind and where it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned {
    pub kind: BlockTokenKind,
    pub end: Position,
}
