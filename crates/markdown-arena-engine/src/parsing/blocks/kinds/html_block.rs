use std::sync::LazyLock;

use regex::Regex;

use crate::parsing::blocks::{
    line::{Line, after_optional_indent},
    token::{BlockTokenKind, Scanned},
};

/// Tags whose opening or closing form starts a condition-6 block.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Tags whose content is raw until the matching close tag.
pub const RAW_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

/// A complete open or closing tag alone on its line.
static COMPLETE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:<[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?>|</[A-Za-z][A-Za-z0-9-]*\s*>)\s*$"#,
    )
    .unwrap()
});

/// The seven start conditions, each with its own end rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlCondition {
    /// `<script>`, `<pre>`, `<style>`, `<textarea>`: ends at the close tag.
    Raw,
    /// `<!--`: ends at `-->`.
    Comment,
    /// `<?`: ends at `?>`.
    ProcessingInstruction,
    /// `<!X`: ends at `>`.
    Declaration,
    /// `<![CDATA[`: ends at `]]>`.
    Cdata,
    /// A known block tag: ends before a blank line.
    BlockTag,
    /// Any other complete tag alone on the line: ends before a blank line.
    CompleteTag,
}

impl HtmlCondition {
    /// True if `text` (a whole line) satisfies this condition's end rule.
    /// Conditions 6 and 7 end on blank lines instead.
    fn ends_on(self, text: &str) -> bool {
        match self {
            HtmlCondition::Raw => {
                let lower = text.to_ascii_lowercase();
                RAW_TAGS
                    .iter()
                    .any(|tag| lower.contains(&format!("</{tag}>")))
            }
            HtmlCondition::Comment => text.contains("-->"),
            HtmlCondition::ProcessingInstruction => text.contains("?>"),
            HtmlCondition::Declaration => text.contains('>'),
            HtmlCondition::Cdata => text.contains("]]>"),
            HtmlCondition::BlockTag | HtmlCondition::CompleteTag => false,
        }
    }

    fn ends_at_blank(self) -> bool {
        matches!(self, HtmlCondition::BlockTag | HtmlCondition::CompleteTag)
    }
}

pub struct HtmlBlock;

impl HtmlBlock {
    pub fn condition(text: &str) -> Option<HtmlCondition> {
        let (_, rest) = after_optional_indent(text)?;
        if !rest.starts_with('<') {
            return None;
        }
        if rest.starts_with("<!--") {
            return Some(HtmlCondition::Comment);
        }
        if rest.starts_with("<?") {
            return Some(HtmlCondition::ProcessingInstruction);
        }
        if rest.starts_with("<![CDATA[") {
            return Some(HtmlCondition::Cdata);
        }
        if rest.len() > 2 && rest.starts_with("<!") && rest.as_bytes()[2].is_ascii_alphabetic() {
            return Some(HtmlCondition::Declaration);
        }

        let closing = rest.starts_with("</");
        let name_at = if closing { 2 } else { 1 };
        let name_len = rest[name_at..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        let name = rest[name_at..name_at + name_len].to_ascii_lowercase();
        let after = &rest[name_at + name_len..];
        let boundary = after.is_empty()
            || after.starts_with([' ', '\t', '>'])
            || after.starts_with("/>");

        if !closing && boundary && RAW_TAGS.contains(&name.as_str()) {
            return Some(HtmlCondition::Raw);
        }
        if boundary && BLOCK_TAGS.contains(&name.as_str()) {
            return Some(HtmlCondition::BlockTag);
        }
        COMPLETE_TAG
            .is_match(rest)
            .then_some(HtmlCondition::CompleteTag)
    }

    pub fn scan<'a>(source: &'a str, line: &Line<'a>) -> Option<Scanned> {
        let condition = Self::condition(line.text)?;
        let mut lines = vec![line.text];
        let mut end = line.end();
        if !condition.ends_on(line.text) {
            let mut next = line.next(source);
            while let Some(current) = next {
                if condition.ends_at_blank() && current.is_blank() {
                    break;
                }
                lines.push(current.text);
                end = current.end();
                if condition.ends_on(current.text) {
                    break;
                }
                next = current.next(source);
            }
        }
        Some(Scanned {
            kind: BlockTokenKind::HtmlBlock {
                value: lines.join("\n"),
            },
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Position;
    use rstest::rstest;

    #[rstest]
    #[case("<script>", Some(HtmlCondition::Raw))]
    #[case("<PRE class=\"x\">", Some(HtmlCondition::Raw))]
    #[case("<!-- note", Some(HtmlCondition::Comment))]
    #[case("<?php", Some(HtmlCondition::ProcessingInstruction))]
    #[case("<!DOCTYPE html>", Some(HtmlCondition::Declaration))]
    #[case("<![CDATA[", Some(HtmlCondition::Cdata))]
    #[case("<div>", Some(HtmlCondition::BlockTag))]
    #[case("</table>", Some(HtmlCondition::BlockTag))]
    #[case("<custom-el attr=\"1\">", Some(HtmlCondition::CompleteTag))]
    #[case("<span>text", None)]
    #[case("<notatag", None)]
    #[case("a <div>", None)]
    fn start_conditions(#[case] text: &str, #[case] expected: Option<HtmlCondition>) {
        assert_eq!(HtmlBlock::condition(text), expected);
    }

    fn scan(src: &str) -> Scanned {
        let line = Line::read(src, Position::ZERO).unwrap();
        HtmlBlock::scan(src, &line).unwrap()
    }

    #[test]
    fn block_tag_ends_before_blank_line() {
        let scanned = scan("<div>\n*x*\n\ntext\n");
        assert_eq!(scanned.end.offset, 10);
        assert_eq!(
            scanned.kind,
            BlockTokenKind::HtmlBlock {
                value: "<div>\n*x*".into()
            }
        );
    }

    #[test]
    fn comment_ends_on_marker_line() {
        let scanned = scan("<!-- a\n\nb -->\nafter\n");
        assert_eq!(scanned.end.offset, 14);
    }

    #[test]
    fn single_line_raw_block() {
        let scanned = scan("<script>x()</script>\nnext\n");
        assert_eq!(scanned.end.offset, 21);
    }

    #[test]
    fn unterminated_runs_to_eof() {
        let scanned = scan("<pre>\ncode");
        assert_eq!(scanned.end.offset, 10);
    }
}
