//! # Inline Tokenization
//!
//! Cursor-based scanning of the inline text of paragraphs, headings, list
//! items, blockquotes and table cells.
//!
//! ## Modules
//!
//! - **`cursor`**: `Cursor` over a sub-range of a block's text
//! - **`kinds`**: one scanner per construct, each owning its delimiters
//! - **`token`**: `InlineToken` and its kinds
//! - **`tokenizer`**: `InlineTokenizer`, `tokenize`, `plain_text`
//!
//! ## Raw Zone Precedence
//!
//! Code spans take precedence: `` `*not emphasis*` `` is a single code span,
//! and closer searches for emphasis and links step over code spans.
//!
//! ## Nesting
//!
//! Container tokens (emphasis, strong, strikethrough, links, images) carry
//! the range of their content. The tree builder tokenizes those ranges
//! again, down to [`MAX_INLINE_DEPTH`]; deeper content is kept as text.

pub mod cursor;
pub mod kinds;
pub mod token;
pub mod tokenizer;

pub use token::{InlineToken, InlineTokenKind};
pub use tokenizer::{InlineTokenizer, plain_text, tokenize, tokenize_range};

/// Maximum nesting of inline containers.
pub const MAX_INLINE_DEPTH: usize = 32;
