pub mod block_quote;
pub mod code_fence;
pub mod definition;
pub mod heading;
pub mod html_block;
pub mod indented_code;
pub mod list_item;
pub mod paragraph;
pub mod table;
pub mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceKind, FenceOpen};
pub use definition::Definition;
pub use heading::Heading;
pub use html_block::{HtmlBlock, HtmlCondition};
pub use indented_code::IndentedCode;
pub use list_item::{ListItem, ListMarker};
pub use paragraph::Paragraph;
pub use table::Table;
pub use thematic_break::ThematicBreak;
