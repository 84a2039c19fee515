use std::ops::Range;

use crate::tree::Span;

/// An inline lexical unit of one block's text.
///
/// `range` indexes the block's [`InlineText`](crate::parsing::text::InlineText);
/// `span` is the same extent in source coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineToken<'t> {
    pub kind: InlineTokenKind,
    pub range: Range<usize>,
    pub span: Span,
    pub raw: &'t str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineTokenKind {
    /// Literal text; differs from `raw` where escapes were resolved.
    Text { value: String },
    CodeSpan { value: String },
    /// Container kinds carry the range of their content, which is
    /// tokenized again when lowered.
    Emphasis { inner: Range<usize> },
    Strong { inner: Range<usize> },
    Strikethrough { inner: Range<usize> },
    Link {
        inner: Range<usize>,
        url: String,
        title: Option<String>,
    },
    Image {
        inner: Range<usize>,
        url: String,
        title: Option<String>,
    },
    /// `<scheme:...>`, `<a@b.c>`, bare `http(s)://`, `www.` and email runs.
    Autolink {
        url: String,
        /// Range of the visible text (without angle brackets).
        text: Range<usize>,
    },
    HardBreak,
    SoftBreak,
}

impl InlineTokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            InlineTokenKind::Text { .. } => "text",
            InlineTokenKind::CodeSpan { .. } => "codeSpan",
            InlineTokenKind::Emphasis { .. } => "emphasis",
            InlineTokenKind::Strong { .. } => "strong",
            InlineTokenKind::Strikethrough { .. } => "strikethrough",
            InlineTokenKind::Link { .. } => "link",
            InlineTokenKind::Image { .. } => "image",
            InlineTokenKind::Autolink { .. } => "autolink",
            InlineTokenKind::HardBreak => "hardBreak",
            InlineTokenKind::SoftBreak => "softBreak",
        }
    }

    /// Range of nested inline content, for container kinds.
    pub fn inner(&self) -> Option<Range<usize>> {
        match self {
            InlineTokenKind::Emphasis { inner }
            | InlineTokenKind::Strong { inner }
            | InlineTokenKind::Strikethrough { inner }
            | InlineTokenKind::Link { inner, .. }
            | InlineTokenKind::Image { inner, .. } => Some(inner.clone()),
            _ => None,
        }
    }
}
