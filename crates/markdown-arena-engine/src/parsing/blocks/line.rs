use crate::tree::Position;

/// Columns a tab advances to (the next multiple of this).
pub const TAB_STOP: usize = 4;

/// One physical line, read lazily at a line-start position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Position of the first byte. Always at column 0.
    pub start: Position,
    /// The line including its terminator, if any.
    pub raw: &'a str,
    /// The line without `\n` / `\r\n`.
    pub text: &'a str,
}

/// Leading whitespace of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent {
    pub columns: usize,
    pub bytes: usize,
}

impl<'a> Line<'a> {
    /// Reads the line beginning at `start`, or `None` at end of input.
    pub fn read(source: &'a str, start: Position) -> Option<Line<'a>> {
        let rest = source.get(start.offset..)?;
        if rest.is_empty() {
            return None;
        }
        let raw = match rest.find('\n') {
            Some(nl) => &rest[..=nl],
            None => rest,
        };
        let text = raw
            .strip_suffix('\n')
            .map_or(raw, |t| t.strip_suffix('\r').unwrap_or(t));
        Some(Line { start, raw, text })
    }

    pub fn has_newline(&self) -> bool {
        self.raw.ends_with('\n')
    }

    /// Position just past the terminator; the start of the next line.
    pub fn end(&self) -> Position {
        if self.has_newline() {
            Position::new(self.start.line + 1, 0, self.start.offset + self.raw.len())
        } else {
            self.position_at(self.raw.len())
        }
    }

    /// Position of byte `byte` of the line. Must not be past the terminator.
    pub fn position_at(&self, byte: usize) -> Position {
        Position::new(
            self.start.line,
            self.start.column + byte,
            self.start.offset + byte,
        )
    }

    /// Reads the line that follows this one.
    pub fn next(&self, source: &'a str) -> Option<Line<'a>> {
        Line::read(source, self.end())
    }

    pub fn is_blank(&self) -> bool {
        is_blank(self.text)
    }

    pub fn indent(&self) -> Indent {
        indent_of(self.text)
    }

    /// Text after the leading whitespace.
    pub fn trimmed(&self) -> &'a str {
        &self.text[self.indent().bytes..]
    }

    /// Byte index into `text` of the first non-whitespace byte.
    pub fn content_start(&self) -> usize {
        self.indent().bytes
    }
}

pub fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b == b' ' || b == b'\t')
}

pub fn indent_of(text: &str) -> Indent {
    let mut indent = Indent::default();
    for b in text.bytes() {
        match b {
            b' ' => indent.columns += 1,
            b'\t' => indent.columns += TAB_STOP - indent.columns % TAB_STOP,
            _ => break,
        }
        indent.bytes += 1;
    }
    indent
}

/// Byte length of the prefix covering at most `columns` columns of leading
/// whitespace. A tab that straddles the limit is consumed whole.
pub fn strip_columns(text: &str, columns: usize) -> usize {
    let mut col = 0;
    let mut bytes = 0;
    for b in text.bytes() {
        if col >= columns {
            break;
        }
        match b {
            b' ' => col += 1,
            b'\t' => col += TAB_STOP - col % TAB_STOP,
            _ => break,
        }
        bytes += 1;
    }
    bytes
}

/// Up to three spaces of indentation are allowed before most block markers.
/// Returns the marker text after them, or `None` if the line is indented
/// further.
pub fn after_optional_indent(text: &str) -> Option<(usize, &str)> {
    let indent = indent_of(text);
    (indent.columns < 4).then(|| (indent.bytes, &text[indent.bytes..]))
}
