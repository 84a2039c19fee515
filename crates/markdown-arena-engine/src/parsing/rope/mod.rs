//! Helpers over [`xi_rope::Rope`] used where a document is edited in place:
//! the incremental parser keeps its baseline text as a rope, and snapshot
//! output previews spans from one.

pub mod slice;

pub use slice::{position_at, preview, slice_to_string};
