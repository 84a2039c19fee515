//! # Inline Kinds
//!
//! Inline constructs that own their delimiters. The tokenizer calls these
//! constants and scanners; it never hardcodes `[` or `` ` ``.
//!
//! - **`CodeSpan`**: raw zone, skipped by every other closer search
//! - **`Emphasis`**: `*`, `_` and `~~` delimiter runs
//! - **`Link`**: `[text](url "title")` and `![alt](url)`
//! - **`Autolink`**: `<...>` and GFM bare URLs and emails
//! - **`Escape`**: backslash escapes and backslash hard breaks

pub mod autolink;
pub mod code_span;
pub mod emphasis;
pub mod escape;
pub mod link;

pub use autolink::{Autolink, AutolinkMatch};
pub use code_span::CodeSpan;
pub use emphasis::{Closer, Emphasis, Unclosed};
pub use escape::{Escape, Escaped};
pub use link::{Brackets, Link, LinkMatch};
