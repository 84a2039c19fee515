use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::parsing::blocks::batch::{DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};

/// Options for a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Build the query index before returning the tree.
    pub build_index: bool,
    /// Allocate nodes through the parser's node pool.
    pub use_node_pool: bool,
    /// Use the batch tokenizer, which coalesces plain lines into paragraphs.
    pub use_batch_tokenizer: bool,
    /// Lines per batch, `1..=128`.
    pub batch_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            build_index: false,
            use_node_pool: true,
            use_batch_tokenizer: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ParseOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(OptionsError::BatchSize(self.batch_size));
        }
        Ok(())
    }

    pub fn with_index(mut self) -> Self {
        self.build_index = true;
        self
    }

    pub fn batched(mut self, batch_size: usize) -> Self {
        self.use_batch_tokenizer = true;
        self.batch_size = batch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults() {
        let o = ParseOptions::default();
        assert!(!o.build_index);
        assert!(o.use_node_pool);
        assert!(!o.use_batch_tokenizer);
        assert_eq!(o.batch_size, 16);
        assert!(o.validate().is_ok());
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(128, true)]
    #[case(129, false)]
    fn batch_size_bounds(#[case] size: usize, #[case] ok: bool) {
        let o = ParseOptions::default().batched(size);
        assert_eq!(o.validate().is_ok(), ok);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let o: ParseOptions = serde_json::from_str(r#"{"build_index": true}"#).unwrap();
        assert!(o.build_index);
        assert!(o.use_node_pool);
        assert_eq!(o.batch_size, DEFAULT_BATCH_SIZE);
    }
}
