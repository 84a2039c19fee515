//! # Snapshot Testing Support
//!
//! Utilities for testing the parser via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`outline`**: renders a tree as an indented, stable text outline for
//!   `insta` snapshots
//! - **`invariants`**: panicking checks for parser correctness (arena
//!   structure, pre-order ids, spans in bounds, child spans contained in
//!   parents)

pub mod invariants;
pub mod outline;

pub use invariants::check as invariants;
pub use outline::outline;
