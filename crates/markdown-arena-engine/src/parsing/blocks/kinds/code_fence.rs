use crate::parsing::blocks::{
    line::{Line, after_optional_indent, indent_of, is_blank, strip_columns},
    token::{BlockTokenKind, Scanned},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn byte(self) -> u8 {
        match self {
            FenceKind::Backticks => b'`',
            FenceKind::Tildes => b'~',
        }
    }
}

/// An opening fence line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen<'a> {
    pub kind: FenceKind,
    pub len: usize,
    /// Columns of indentation before the fence; removed from body lines.
    pub indent: usize,
    pub info: &'a str,
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";
    pub const MIN_LEN: usize = 3;

    pub fn open(text: &str) -> Option<FenceOpen<'_>> {
        let (_, rest) = after_optional_indent(text)?;
        let kind = if rest.starts_with(Self::BACKTICKS) {
            FenceKind::Backticks
        } else if rest.starts_with(Self::TILDES) {
            FenceKind::Tildes
        } else {
            return None;
        };
        let len = rest.bytes().take_while(|&b| b == kind.byte()).count();
        let info = rest[len..].trim_matches([' ', '\t']);
        // A backtick in the info string would make this an inline code span.
        if kind == FenceKind::Backticks && info.contains('`') {
            return None;
        }
        Some(FenceOpen {
            kind,
            len,
            indent: indent_of(text).columns,
            info,
        })
    }

    /// True if `text` closes a fence opened with `open`.
    pub fn closes(open: &FenceOpen<'_>, text: &str) -> bool {
        let Some((_, rest)) = after_optional_indent(text) else {
            return false;
        };
        let run = rest.bytes().take_while(|&b| b == open.kind.byte()).count();
        run >= open.len && is_blank(&rest[run..])
    }

    /// Splits an info string into language and meta.
    pub fn info(info: &str) -> (Option<String>, Option<String>) {
        let mut parts = info.splitn(2, [' ', '\t']);
        let lang = parts
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| html_escape::decode_html_entities(s).into_owned());
        let meta = parts
            .next()
            .map(|s| s.trim_matches([' ', '\t']))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        (lang, meta)
    }

    /// Scans a fenced block. Unterminated fences run to end of input.
    pub fn scan<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        let open = Self::open(line.text)?;
        let (lang, meta) = Self::info(open.info);

        let mut body: Vec<&str> = Vec::new();
        let mut end = line.end();
        let mut closed = false;
        let mut next = line.next(source);
        while let Some(current) = next {
            end = current.end();
            if Self::closes(&open, current.text) {
                closed = true;
                break;
            }
            let strip = strip_columns(current.text, open.indent);
            body.push(&current.text[strip..]);
            next = current.next(source);
        }

        Some(Scanned {
            kind: BlockTokenKind::Code {
                lang,
                meta,
                value: body.join("\n"),
                fenced: true,
                closed,
            },
            end,
        })
    }
}
