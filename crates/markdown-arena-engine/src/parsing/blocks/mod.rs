//! # Block Tokenization
//!
//! Single left-to-right pass over the source producing position-tagged block
//! tokens. Lines are read lazily at the cursor; there is no eager split.
//!
//! ## Dispatch order (per line start)
//!
//! 1. blank line
//! 2. indented code (4+ columns)
//! 3. fenced code (```` ``` ```` / `~~~`)
//! 4. ATX heading
//! 5. thematic break (before list items: `-` and `*` are shared)
//! 6. list item (with optional task marker)
//! 7. blockquote (a run of `>` lines)
//! 8. GFM table (needs the delimiter row on the next line)
//! 9. HTML block (seven start conditions)
//! 10. link reference definition
//! 11. setext heading (needs the underline on the next line)
//! 12. paragraph (a single line)
//!
//! ## Modules
//!
//! - **`line`**: `Line` reader and indentation helpers
//! - **`token`**: `BlockToken` and its kinds
//! - **`kinds`**: one scanner per construct, each owning its delimiters
//! - **`open`**: `try_open` dispatch
//! - **`tokenizer`**: the standard `BlockTokenizer`
//! - **`batch`**: `BatchTokenizer`, which coalesces plain lines
//!
//! ## Key Invariants
//!
//! - Token spans are computed from cursor positions and never recomputed.
//! - Concatenating every token's `raw` reproduces the source exactly.
//! - Tokenizing never fails: anything unrecognised is a paragraph.

pub mod batch;
pub mod kinds;
pub mod line;
pub mod open;
pub mod token;
pub mod tokenizer;

pub use batch::{BatchTokenizer, LineMeta};
pub use line::Line;
pub use token::{BlockToken, BlockTokenKind, TableCellToken, TableRowToken};
pub use tokenizer::{BlockTokenizer, tokenize};
