//! Pipeline tests: tokenize → build → outline.
//!
//! Outlines are compared with `insta` inline snapshots. Every parsed tree is
//! also run through the snapshot invariant checks.

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::parsing::{ParseOptions, Parser, blocks::tokenize, parse, snapshot};
use crate::tree::{NodeData, NodeId, NodeKind, Tree};

fn parsed(source: &str) -> Tree {
    let tree = parse(source);
    snapshot::invariants(&tree);
    tree.check_pre_order().unwrap();
    tree
}

fn outline(source: &str) -> String {
    snapshot::outline(&parsed(source)).trim_end().to_string()
}

#[test]
fn empty_document() {
    let tree = parsed("");
    assert_eq!(tree.len(), 1);
    assert!(tree.root_node().children.is_empty());
}

#[test]
fn blank_lines_only() {
    let tree = parsed("\n  \n\t\n");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.root_node().span.end.offset, 6);
}

#[test]
fn atx_heading() {
    assert_snapshot!(outline("# Hello"), @r#"
    root 0..7
      heading 0..7 depth=1 setext=false
        text 2..7 value="Hello"
    "#);
}

#[test]
fn task_list_items() {
    assert_snapshot!(outline("- [x] Done\n- [ ] Todo"), @r#"
    root 0..21
      listItem 0..11 ordered=false marker="-" number=null checked=true
        text 6..10 value="Done"
      listItem 11..21 ordered=false marker="-" number=null checked=false
        text 17..21 value="Todo"
    "#);
}

#[test]
fn fenced_code() {
    assert_snapshot!(outline("```js\ncode\n```"), @r#"
    root 0..14
      code 0..14 lang="js" meta=null value="code" fenced=true
    "#);
}

#[test]
fn blockquote_and_rule() {
    assert_snapshot!(outline("> quote *em*\n\n---\n"), @r#"
    root 0..18
      blockquote 0..13 depth=1
        text 2..8 value="quote "
        emphasis 8..12
          text 9..11 value="em"
      thematicBreak 14..18
    "#);
}

#[test]
fn link_and_code_span() {
    assert_snapshot!(outline("see [docs](/d \"D\") or `x`\n"), @r#"
    root 0..26
      paragraph 0..26
        text 0..4 value="see "
        link 4..18 url="/d" title="D" autolink=false
          text 5..9 value="docs"
        text 18..22 value=" or "
        inlineCode 22..25 value="x"
    "#);
}

#[test]
fn table() {
    assert_snapshot!(outline("| a | b |\n|:-|-:|\n| 1 | 2 |\n"), @r#"
    root 0..28
      table 0..28 align=[left, right]
        tableRow 0..9 header=true
          tableCell 2..3 align="left"
            text 2..3 value="a"
          tableCell 6..7 align="right"
            text 6..7 value="b"
        tableRow 18..27 header=false
          tableCell 20..21 align="left"
            text 20..21 value="1"
          tableCell 24..25 align="right"
            text 24..25 value="2"
    "#);
}

#[test]
fn setext_heading_and_definition() {
    assert_snapshot!(outline("Title\n===\n\n[Ref]: /url 'T'\n"), @r#"
    root 0..27
      heading 0..10 depth=1 setext=true
        text 0..5 value="Title"
      definition 11..27 label="ref" url="/url" title="T"
    "#);
}

#[test]
fn unclosed_constructs_become_text() {
    let tree = parsed("[unclosed and `also unclosed *nope");
    let para = tree.root_node().children[0];
    let kinds: Vec<_> = tree
        .children_of(para)
        .iter()
        .map(|&c| tree.nodes[c.0].kind())
        .collect();
    assert_eq!(kinds, vec![NodeKind::Text]);
    assert_eq!(
        tree.text_content(para),
        "[unclosed and `also unclosed *nope"
    );
}

#[rstest]
#[case("see www. for details\n")]
#[case("www.\n")]
#[case("go to http:// now")]
fn link_prefix_without_host_is_text(#[case] source: &str) {
    let tree = parsed(source);
    let para = tree.root_node().children[0];
    assert!(
        tree.descendants(para)
            .all(|id| tree.nodes[id.0].kind() != NodeKind::Link)
    );
    assert_eq!(tree.text_content(para), source.trim_end());
}

#[test]
fn code_span_suppresses_links() {
    let tree = parsed("`[not](a link)`");
    let para = tree.root_node().children[0];
    let child = tree.children_of(para)[0];
    assert_eq!(
        tree.nodes[child.0].data,
        NodeData::InlineCode {
            value: "[not](a link)".to_string()
        }
    );
}

#[rstest]
#[case("# h\n\npara\n")]
#[case("```\nunterminated\n")]
#[case("> a\n> b\n\n- c\n1. d\n")]
#[case("<div>\nhtml\n</div>\n\ntext\n")]
#[case("    indented\n\n***\n")]
#[case("no trailing newline")]
#[case("\r\nwindows\r\nlines\r\n")]
fn raw_tokens_reproduce_source(#[case] source: &str) {
    let joined: String = tokenize(source).iter().map(|t| t.raw).collect();
    assert_eq!(joined, source);
}

#[test]
fn batch_tokenizer_coalesces_paragraphs() {
    let source = "one\ntwo\nthree\n\n# h\n";
    let mut parser = Parser::new(ParseOptions::default().batched(4)).unwrap();
    let tree = parser.parse(source);
    snapshot::invariants(&tree);
    let kinds: Vec<_> = tree
        .root_node()
        .children
        .iter()
        .map(|&c| tree.nodes[c.0].kind())
        .collect();
    assert_eq!(kinds, vec![NodeKind::Paragraph, NodeKind::Heading]);
    let para = tree.root_node().children[0];
    assert_eq!(tree.text_content(para), "one\ntwo\nthree");
}

#[test]
fn standard_tokenizer_keeps_one_paragraph_per_line() {
    let tree = parsed("one\ntwo\n");
    assert_eq!(tree.root_node().children.len(), 2);
}

#[test]
fn index_built_on_request() {
    let mut parser = Parser::new(ParseOptions::default().with_index()).unwrap();
    let tree = parser.parse("# a\n");
    let index = tree.cached_index().unwrap();
    assert_eq!(index.find_by_type(NodeKind::Heading).unwrap(), vec![NodeId(1)]);

    let plain = parse("# a\n");
    assert!(plain.cached_index().is_none());
}

#[test]
fn lazily_built_index() {
    let mut tree = parse("# a\n\nb\n");
    assert!(tree.cached_index().is_none());
    let paragraphs = tree.index().find_by_type(NodeKind::Paragraph).unwrap();
    assert_eq!(paragraphs.len(), 1);
    assert!(tree.cached_index().is_some());
}

#[test]
fn recycled_nodes_are_reused() {
    let mut parser = Parser::default();
    let first = parser.parse("# a\n\nb *c*\n");
    let count = first.len();
    parser.recycle(first);
    assert_eq!(parser.pool().available(), count);
    let second = parser.parse("# a\n\nb *c*\n");
    // The root is never pooled.
    assert_eq!(parser.pool_stats().reused, count - 1);
    assert_eq!(snapshot::outline(&second), snapshot::outline(&parse("# a\n\nb *c*\n")));
}

#[test]
fn json_wire_shape() {
    let tree = parse("# Hi\n");
    let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
    assert_eq!(value["root"], 0);
    assert_eq!(value["meta"]["language"], "markdown");
    let heading = &value["nodes"][1];
    assert_eq!(heading["type"], "heading");
    assert_eq!(heading["data"]["depth"], 1);
    assert_eq!(heading["parent"], 0);
    assert_eq!(heading["children"], serde_json::json!([2]));
    assert_eq!(heading["span"]["start"]["offset"], 0);
    assert_eq!(value["nodes"][0]["data"], serde_json::json!({}));
}
