use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownNodeKind;

use super::span::Span;

/// Arena slot index of a node. Only meaningful within the tree that owns it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic root always occupies slot 0.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The type discriminator of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Root,
    Heading,
    Paragraph,
    Code,
    ListItem,
    Blockquote,
    ThematicBreak,
    Table,
    TableRow,
    TableCell,
    HtmlBlock,
    Definition,
    Text,
    Emphasis,
    Strong,
    InlineCode,
    Link,
    Image,
    Break,
    Delete,
}

impl NodeKind {
    pub const ALL: [NodeKind; 20] = [
        NodeKind::Root,
        NodeKind::Heading,
        NodeKind::Paragraph,
        NodeKind::Code,
        NodeKind::ListItem,
        NodeKind::Blockquote,
        NodeKind::ThematicBreak,
        NodeKind::Table,
        NodeKind::TableRow,
        NodeKind::TableCell,
        NodeKind::HtmlBlock,
        NodeKind::Definition,
        NodeKind::Text,
        NodeKind::Emphasis,
        NodeKind::Strong,
        NodeKind::InlineCode,
        NodeKind::Link,
        NodeKind::Image,
        NodeKind::Break,
        NodeKind::Delete,
    ];

    /// The wire name used in serialized trees (`"listItem"`, `"inlineCode"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Code => "code",
            NodeKind::ListItem => "listItem",
            NodeKind::Blockquote => "blockquote",
            NodeKind::ThematicBreak => "thematicBreak",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::HtmlBlock => "htmlBlock",
            NodeKind::Definition => "definition",
            NodeKind::Text => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::InlineCode => "inlineCode",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Break => "break",
            NodeKind::Delete => "delete",
        }
    }

    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::InlineCode
                | NodeKind::Link
                | NodeKind::Image
                | NodeKind::Break
                | NodeKind::Delete
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// Column alignment of a GFM table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::None => "none",
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Center => "center",
        }
    }
}

/// Type-specific payload of a node.
///
/// Serialized adjacently tagged, so a node renders as
/// `{"type": "heading", "data": {"depth": 1, ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum NodeData {
    Root {},
    Heading {
        depth: u8,
        setext: bool,
    },
    Paragraph {},
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
        fenced: bool,
    },
    ListItem {
        ordered: bool,
        marker: char,
        number: Option<u64>,
        checked: Option<bool>,
    },
    Blockquote {
        depth: u8,
    },
    ThematicBreak {},
    Table {
        align: Vec<Alignment>,
    },
    TableRow {
        header: bool,
    },
    TableCell {
        align: Alignment,
    },
    HtmlBlock {
        value: String,
    },
    Definition {
        label: String,
        url: String,
        title: Option<String>,
    },
    Text {
        value: String,
    },
    Emphasis {},
    Strong {},
    InlineCode {
        value: String,
    },
    Link {
        url: String,
        title: Option<String>,
        autolink: bool,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    Break {
        hard: bool,
    },
    Delete {},
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root {} => NodeKind::Root,
            NodeData::Heading { .. } => NodeKind::Heading,
            NodeData::Paragraph {} => NodeKind::Paragraph,
            NodeData::Code { .. } => NodeKind::Code,
            NodeData::ListItem { .. } => NodeKind::ListItem,
            NodeData::Blockquote { .. } => NodeKind::Blockquote,
            NodeData::ThematicBreak {} => NodeKind::ThematicBreak,
            NodeData::Table { .. } => NodeKind::Table,
            NodeData::TableRow { .. } => NodeKind::TableRow,
            NodeData::TableCell { .. } => NodeKind::TableCell,
            NodeData::HtmlBlock { .. } => NodeKind::HtmlBlock,
            NodeData::Definition { .. } => NodeKind::Definition,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Emphasis {} => NodeKind::Emphasis,
            NodeData::Strong {} => NodeKind::Strong,
            NodeData::InlineCode { .. } => NodeKind::InlineCode,
            NodeData::Link { .. } => NodeKind::Link,
            NodeData::Image { .. } => NodeKind::Image,
            NodeData::Break { .. } => NodeKind::Break,
            NodeData::Delete {} => NodeKind::Delete,
        }
    }

    /// The blank payload for `kind`, used when a pooled node is reset.
    pub fn empty(kind: NodeKind) -> NodeData {
        match kind {
            NodeKind::Root => NodeData::Root {},
            NodeKind::Heading => NodeData::Heading {
                depth: 1,
                setext: false,
            },
            NodeKind::Paragraph => NodeData::Paragraph {},
            NodeKind::Code => NodeData::Code {
                lang: None,
                meta: None,
                value: String::new(),
                fenced: false,
            },
            NodeKind::ListItem => NodeData::ListItem {
                ordered: false,
                marker: '-',
                number: None,
                checked: None,
            },
            NodeKind::Blockquote => NodeData::Blockquote { depth: 1 },
            NodeKind::ThematicBreak => NodeData::ThematicBreak {},
            NodeKind::Table => NodeData::Table { align: Vec::new() },
            NodeKind::TableRow => NodeData::TableRow { header: false },
            NodeKind::TableCell => NodeData::TableCell {
                align: Alignment::None,
            },
            NodeKind::HtmlBlock => NodeData::HtmlBlock {
                value: String::new(),
            },
            NodeKind::Definition => NodeData::Definition {
                label: String::new(),
                url: String::new(),
                title: None,
            },
            NodeKind::Text => NodeData::Text {
                value: String::new(),
            },
            NodeKind::Emphasis => NodeData::Emphasis {},
            NodeKind::Strong => NodeData::Strong {},
            NodeKind::InlineCode => NodeData::InlineCode {
                value: String::new(),
            },
            NodeKind::Link => NodeData::Link {
                url: String::new(),
                title: None,
                autolink: false,
            },
            NodeKind::Image => NodeData::Image {
                url: String::new(),
                title: None,
                alt: String::new(),
            },
            NodeKind::Break => NodeData::Break { hard: false },
            NodeKind::Delete => NodeData::Delete {},
        }
    }

    /// Scalar fields of the payload as `(key, value)` pairs, keyed by their
    /// wire names. Sequence fields (table alignment) are not included.
    pub fn fields(&self) -> Vec<(&'static str, DataValue)> {
        match self {
            NodeData::Heading { depth, setext } => {
                vec![("depth", (*depth).into()), ("setext", (*setext).into())]
            }
            NodeData::Code {
                lang,
                meta,
                value,
                fenced,
            } => vec![
                ("lang", lang.as_deref().into()),
                ("meta", meta.as_deref().into()),
                ("value", value.as_str().into()),
                ("fenced", (*fenced).into()),
            ],
            NodeData::ListItem {
                ordered,
                marker,
                number,
                checked,
            } => vec![
                ("ordered", (*ordered).into()),
                ("marker", DataValue::Str(marker.to_string())),
                ("number", (*number).into()),
                ("checked", (*checked).into()),
            ],
            NodeData::Blockquote { depth } => vec![("depth", (*depth).into())],
            NodeData::TableRow { header } => vec![("header", (*header).into())],
            NodeData::TableCell { align } => vec![("align", align.as_str().into())],
            NodeData::HtmlBlock { value }
            | NodeData::Text { value }
            | NodeData::InlineCode { value } => vec![("value", value.as_str().into())],
            NodeData::Definition { label, url, title } => vec![
                ("label", label.as_str().into()),
                ("url", url.as_str().into()),
                ("title", title.as_deref().into()),
            ],
            NodeData::Link {
                url,
                title,
                autolink,
            } => vec![
                ("url", url.as_str().into()),
                ("title", title.as_deref().into()),
                ("autolink", (*autolink).into()),
            ],
            NodeData::Image { url, title, alt } => vec![
                ("url", url.as_str().into()),
                ("title", title.as_deref().into()),
                ("alt", alt.as_str().into()),
            ],
            NodeData::Break { hard } => vec![("hard", (*hard).into())],
            NodeData::Root {}
            | NodeData::Paragraph {}
            | NodeData::ThematicBreak {}
            | NodeData::Table { .. }
            | NodeData::Emphasis {}
            | NodeData::Strong {}
            | NodeData::Delete {} => vec![],
        }
    }

    pub fn field(&self, key: &str) -> Option<DataValue> {
        self.fields()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

/// A scalar payload value, as stored in the data index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<u8> for DataValue {
    fn from(v: u8) -> Self {
        DataValue::Int(i64::from(v))
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int(i64::from(v))
    }
}

impl From<u64> for DataValue {
    fn from(v: u64) -> Self {
        DataValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Str(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Str(v)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DataValue::Null, Into::into)
    }
}

/// One arena slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub span: Span,
}

impl Node {
    pub fn new(data: NodeData, span: Span) -> Self {
        Self {
            id: NodeId::ROOT,
            data,
            parent: None,
            children: Vec::new(),
            span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Clears every field so the slot can be handed out again as `kind`.
    /// The children buffer keeps its capacity.
    pub fn reset(&mut self, kind: NodeKind) {
        self.id = NodeId::ROOT;
        self.parent = None;
        self.children.clear();
        self.span = Span::default();
        self.data = NodeData::empty(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
            assert_eq!(NodeData::empty(kind).kind(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("section".parse::<NodeKind>().is_err());
    }

    #[test]
    fn heading_fields() {
        let data = NodeData::Heading {
            depth: 2,
            setext: false,
        };
        assert_eq!(data.field("depth"), Some(DataValue::Int(2)));
        assert_eq!(data.field("missing"), None);
    }

    #[test]
    fn optional_fields_become_null() {
        let data = NodeData::ListItem {
            ordered: false,
            marker: '-',
            number: None,
            checked: None,
        };
        assert_eq!(data.field("checked"), Some(DataValue::Null));
        assert_eq!(data.field("marker"), Some(DataValue::Str("-".into())));
    }

    #[test]
    fn serializes_type_and_data() {
        let node = Node::new(
            NodeData::Heading {
                depth: 1,
                setext: false,
            },
            Span::default(),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["data"]["depth"], 1);
        assert_eq!(json["parent"], serde_json::Value::Null);
        assert!(json["children"].as_array().unwrap().is_empty());
        assert_eq!(json["span"]["start"]["offset"], 0);
    }

    #[test]
    fn empty_payload_serializes_as_object() {
        let node = Node::new(NodeData::Paragraph {}, Span::default());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert!(json["data"].as_object().unwrap().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut node = Node::new(
            NodeData::Text {
                value: "hello".into(),
            },
            Span::default(),
        );
        node.id = NodeId(7);
        node.parent = Some(NodeId(3));
        node.children.push(NodeId(8));
        node.reset(NodeKind::Strong);
        assert_eq!(node.id, NodeId::ROOT);
        assert_eq!(node.parent, None);
        assert!(node.children.is_empty());
        assert_eq!(node.data, NodeData::Strong {});
    }
}
