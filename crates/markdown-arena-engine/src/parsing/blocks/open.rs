use super::{
    kinds::{
        BlockQuote, CodeFence, Definition, Heading, HtmlBlock, IndentedCode, ListItem, Paragraph,
        Table, ThematicBreak,
    },
    line::Line,
    token::{BlockTokenKind, Scanned},
};

/// Ordered prefix dispatch at a line start. Always recognises something:
/// the last resort is a single-line paragraph.
pub fn try_open<'a>(source: &'a str, line: &Line<'a>) -> Scanned {
    if line.is_blank() {
        return Scanned {
            kind: BlockTokenKind::BlankLine,
            end: line.end(),
        };
    }
    IndentedCode::scan(source, line)
        .or_else(|| CodeFence::scan(source, line))
        .or_else(|| Heading::scan_atx(line))
        // Before list items: `-` and `*` start both.
        .or_else(|| ThematicBreak::scan(line))
        .or_else(|| ListItem::scan(line))
        .or_else(|| BlockQuote::scan(source, line))
        .or_else(|| Table::scan(source, line))
        .or_else(|| HtmlBlock::scan(source, line))
        .or_else(|| Definition::scan(line))
        .or_else(|| Heading::scan_setext(source, line))
        .unwrap_or_else(|| Paragraph::scan(line))
}
