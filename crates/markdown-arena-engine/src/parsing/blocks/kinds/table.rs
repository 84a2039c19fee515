use crate::{
    parsing::{
        blocks::{
            line::Line,
            token::{BlockTokenKind, Scanned, TableCellToken, TableRowToken},
        },
        text::InlineText,
    },
    tree::{Alignment, Span},
};

/// GFM pipe table: a header row, a delimiter row with the same number of
/// cells, then body rows until a line without a pipe.
pub struct Table;

impl Table {
    pub const PIPE: u8 = b'|';

    /// Byte ranges of the trimmed cells of a row. Escaped pipes do not split.
    pub fn split_row(text: &str) -> Vec<(usize, usize)> {
        let bytes = text.as_bytes();
        let mut start = 0;
        let mut end = bytes.len();
        while start < end && matches!(bytes[start], b' ' | b'\t') {
            start += 1;
        }
        while end > start && matches!(bytes[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        if start < end && bytes[start] == Self::PIPE {
            start += 1;
        }
        if end > start && bytes[end - 1] == Self::PIPE && !escaped(bytes, end - 1) {
            end -= 1;
        }

        let mut cells = Vec::new();
        let mut cell_start = start;
        let mut i = start;
        while i < end {
            match bytes[i] {
                b'\\' => i += 2,
                Self::PIPE => {
                    cells.push(trim(bytes, cell_start, i));
                    cell_start = i + 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        cells.push(trim(bytes, cell_start, end.max(cell_start)));
        cells
    }

    pub fn has_pipe(text: &str) -> bool {
        let bytes = text.as_bytes();
        (0..bytes.len()).any(|i| bytes[i] == Self::PIPE && !escaped(bytes, i))
    }

    /// Alignments of a delimiter row such as `| :--- | ---: |`.
    pub fn delimiter_row(text: &str) -> Option<Vec<Alignment>> {
        if !Self::has_pipe(text) {
            return None;
        }
        Self::split_row(text)
            .into_iter()
            .map(|(s, e)| alignment(&text[s..e]))
            .collect()
    }

    pub fn scan<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        if line.indent().columns >= 4 || !Self::has_pipe(line.text) {
            return None;
        }
        let delimiter = line.next(source)?;
        if delimiter.indent().columns >= 4 {
            return None;
        }
        let align = Self::delimiter_row(delimiter.text)?;
        let header = Self::split_row(line.text);
        if header.len() != align.len() {
            return None;
        }

        let mut rows = vec![row(line, &header, align.len())];
        let mut end = delimiter.end();
        let mut next = delimiter.next(source);
        while let Some(current) = next {
            if current.is_blank()
                || current.indent().columns >= 4
                || !Self::has_pipe(current.text)
            {
                break;
            }
            rows.push(row(&current, &Self::split_row(current.text), align.len()));
            end = current.end();
            next = current.next(source);
        }

        Some(Scanned {
            kind: BlockTokenKind::Table { align, rows },
            end,
        })
    }
}

fn escaped(bytes: &[u8], i: usize) -> bool {
    let slashes = bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count();
    slashes % 2 == 1
}

fn trim(bytes: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && matches!(bytes[start], b' ' | b'\t') {
        start += 1;
    }
    while end > start && matches!(bytes[end - 1], b' ' | b'\t') {
        end -= 1;
    }
    (start, end)
}

fn alignment(cell: &str) -> Option<Alignment> {
    let left = cell.starts_with(':');
    let right = cell.len() > 1 && cell.ends_with(':');
    let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];
    if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

/// Builds a row with exactly `columns` cells, padding with empty cells at
/// the end of the line and dropping extras.
fn row(line: &Line<'_>, cells: &[(usize, usize)], columns: usize) -> TableRowToken {
    let line_end = line.position_at(line.text.len());
    let cells = (0..columns)
        .map(|i| match cells.get(i) {
            Some(&(s, e)) => TableCellToken {
                span: Span::new(line.position_at(s), line.position_at(e)),
                content: InlineText::single(&line.text[s..e], line.position_at(s)),
            },
            None => TableCellToken {
                span: Span::new(line_end, line_end),
                content: InlineText::single("", line_end),
            },
        })
        .collect();
    TableRowToken {
        span: Span::new(line.start, line_end),
        cells,
    }
}
