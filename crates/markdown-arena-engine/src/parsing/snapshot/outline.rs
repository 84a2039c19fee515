use std::fmt::Write;

use crate::tree::{DataValue, NodeData, NodeId, Tree};

/// Renders `tree` one node per line, indented by depth:
///
/// ```text
/// root 0..8
///   heading 0..7 depth=1 setext=false
///     text 2..7 value="Hello"
/// ```
///
/// Spans are byte offsets. Ids are left out so outlines of an incrementally
/// updated tree and of a fresh parse can be compared directly.
pub fn outline(tree: &Tree) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree.root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.node(id) else { continue };
        line(&mut out, tree, id, depth);
        stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
    }
    out
}

fn line(out: &mut String, tree: &Tree, id: NodeId, depth: usize) {
    let node = &tree.nodes[id.0];
    let _ = write!(
        out,
        "{:indent$}{} {}..{}",
        "",
        node.kind(),
        node.span.start.offset,
        node.span.end.offset,
        indent = depth * 2
    );
    if let NodeData::Table { align } = &node.data {
        let cols: Vec<&str> = align.iter().map(|a| a.as_str()).collect();
        let _ = write!(out, " align=[{}]", cols.join(", "));
    }
    for (key, value) in node.data.fields() {
        let _ = match value {
            DataValue::Null => write!(out, " {key}=null"),
            DataValue::Bool(b) => write!(out, " {key}={b}"),
            DataValue::Int(n) => write!(out, " {key}={n}"),
            DataValue::Str(s) => write!(out, " {key}={s:?}"),
        };
    }
    out.push('\n');
}
